mod completion_test;
