use async_trait::async_trait;
use docrelay::agents::error::{AgentError, AgentResult};
use docrelay::domain::DocumentationAgent;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum StubReply {
    Answer(String),
    NotConfigured,
    Unavailable,
    /// Never answers; flags when the pending call is dropped
    Hang,
}

/// In-process documentation agent recording the prompts it receives
pub struct StubAgent {
    reply: StubReply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    abandoned: Arc<AtomicBool>,
}

impl StubAgent {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            abandoned: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn answering(answer: &str) -> Arc<Self> {
        Self::new(StubReply::Answer(answer.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentationAgent for StubAgent {
    async fn get_response(&self, message: &str) -> AgentResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(message.to_string());

        match &self.reply {
            StubReply::Answer(answer) => Ok(answer.clone()),
            StubReply::NotConfigured => Err(AgentError::Configuration(
                "agent configuration incomplete, missing agent.api_base".to_string(),
            )),
            StubReply::Unavailable => Err(AgentError::Api {
                status: 503,
                message: "agent offline".to_string(),
            }),
            StubReply::Hang => {
                let _flag = DropFlag(self.abandoned.clone());
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
