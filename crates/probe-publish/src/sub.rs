use crate::error::PublisherError;
use async_trait::async_trait;
use probe_wire::ReportEnvelope;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// One configured destination. Implementations own their own connection
/// state and must be safe to call concurrently with themselves (the
/// publisher dispatches every target's `publish` call concurrently).
#[async_trait]
pub trait SubPublisher: Send + Sync {
    fn target(&self) -> &str;
    async fn publish(&self, envelope: &ReportEnvelope) -> Result<(), PublisherError>;
}

/// Legacy variant: dials `target` fresh on every publish and writes one
/// length-prefixed frame. No connection pooling — matches the low publish
/// rate (one frame per `pubTick`).
pub struct TcpSubPublisher {
    target: String,
}

impl TcpSubPublisher {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }
}

#[async_trait]
impl SubPublisher for TcpSubPublisher {
    fn target(&self) -> &str {
        &self.target
    }

    async fn publish(&self, envelope: &ReportEnvelope) -> Result<(), PublisherError> {
        let frame = probe_wire::encode_frame(envelope)?;
        let mut stream = TcpStream::connect(&self.target).await.map_err(|e| PublisherError::TargetUnreachable {
            target: self.target.clone(),
            reason: e.to_string(),
        })?;
        stream.write_all(&frame).await.map_err(|e| PublisherError::TargetUnreachable {
            target: self.target.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// POSTs the JSON payload to `target` with no length framing (HTTP already
/// delimits the body). `ureq` is a blocking client, so the request runs on
/// the blocking pool rather than the async runtime.
pub struct HttpSubPublisher {
    target: String,
    token: Option<String>,
}

impl HttpSubPublisher {
    pub fn new(target: impl Into<String>, token: Option<String>) -> Self {
        Self {
            target: target.into(),
            token,
        }
    }
}

#[async_trait]
impl SubPublisher for HttpSubPublisher {
    fn target(&self) -> &str {
        &self.target
    }

    async fn publish(&self, envelope: &ReportEnvelope) -> Result<(), PublisherError> {
        let body = probe_wire::encode_payload(envelope)?;
        let target = self.target.clone();
        let token = self.token.clone();

        tokio::task::spawn_blocking(move || -> Result<(), PublisherError> {
            let agent = ureq::AgentBuilder::new()
                .timeout_connect(std::time::Duration::from_secs(2))
                .timeout_read(std::time::Duration::from_secs(10))
                .build();
            let mut req = agent
                .post(&target)
                .set("content-type", probe_wire::REPORT_CONTENT_TYPE);
            if let Some(token) = &token {
                req = req.set("authorization", &format!("Bearer {token}"));
            }
            match req.send_bytes(&body) {
                Ok(_) => Ok(()),
                Err(ureq::Error::Status(code, _)) => Err(PublisherError::TargetUnreachable {
                    target: target.clone(),
                    reason: format!("http status {code}"),
                }),
                Err(ureq::Error::Transport(e)) => Err(PublisherError::TargetUnreachable {
                    target: target.clone(),
                    reason: e.to_string(),
                }),
            }
        })
        .await
        .map_err(|e| PublisherError::TargetUnreachable {
            target: self.target.clone(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }
}
