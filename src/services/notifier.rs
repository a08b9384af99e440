use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{config::NotifierConfig, services::oauth};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("could not sign request: {0}")]
    Signing(#[source] anyhow::Error),
    #[error("request to status endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status endpoint answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Posts status messages to the external OAuth1-authenticated endpoint.
pub struct NotifierService {
    pub client: Client,
    pub config: NotifierConfig,
}

impl NotifierService {
    pub fn new(config: NotifierConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Single attempt; any 2xx answer counts as delivered.
    pub async fn post_status(&self, status: &str) -> Result<(), NotifyError> {
        let params = [("status", status)];
        let authorization = oauth::authorization_header(
            &self.config,
            "POST",
            &self.config.endpoint,
            &params,
            &oauth::Stamp::fresh(),
        )
        .map_err(NotifyError::Signing)?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&params)
            .header("Authorization", authorization)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("status endpoint error {}: {}", status, body);
            return Err(NotifyError::Rejected { status, body });
        }

        tracing::info!("status posted");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::post,
        Router,
    };

    use super::*;

    /// What the stand-in endpoint received.
    #[derive(Debug, Clone)]
    pub struct Received {
        pub status: Option<String>,
        pub authorization: Option<String>,
    }

    #[derive(Clone)]
    struct Endpoint {
        reply: AxumStatus,
        received: Arc<Mutex<Vec<Received>>>,
    }

    async fn update(
        State(endpoint): State<Endpoint>,
        headers: HeaderMap,
        Query(query): Query<std::collections::HashMap<String, String>>,
    ) -> AxumStatus {
        endpoint.received.lock().unwrap().push(Received {
            status: query.get("status").cloned(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        });
        endpoint.reply
    }

    /// Serve a fake status endpoint on an ephemeral port that answers `reply`.
    /// Returns its URL and the log of received requests.
    pub async fn spawn_endpoint(reply: AxumStatus) -> (String, Arc<Mutex<Vec<Received>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/1.1/statuses/update.json", post(update))
            .with_state(Endpoint {
                reply,
                received: received.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/1.1/statuses/update.json"), received)
    }

    pub fn notifier_config(endpoint: String) -> NotifierConfig {
        NotifierConfig {
            endpoint,
            timeout_seconds: 5,
            consumer_key: "consumer".into(),
            consumer_secret: "consumer-secret".into(),
            access_token: "token".into(),
            access_secret: "token-secret".into(),
        }
    }

    #[tokio::test]
    async fn posts_signed_status() {
        let (endpoint, received) = spawn_endpoint(AxumStatus::OK).await;
        let notifier = NotifierService::new(notifier_config(endpoint)).unwrap();

        notifier.post_status("【障害】mail down").await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].status.as_deref(), Some("【障害】mail down"));
        let auth = received[0].authorization.as_deref().unwrap();
        assert!(auth.starts_with("OAuth "));
        assert!(auth.contains("oauth_token=\"token\""));
        assert!(auth.contains("oauth_signature="));
    }

    #[tokio::test]
    async fn non_2xx_is_rejected() {
        let (endpoint, received) = spawn_endpoint(AxumStatus::FORBIDDEN).await;
        let notifier = NotifierService::new(notifier_config(endpoint)).unwrap();

        let err = notifier.post_status("hello").await.unwrap_err();
        assert!(matches!(
            err,
            NotifyError::Rejected { status, .. } if status == StatusCode::FORBIDDEN
        ));
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn any_2xx_is_delivered() {
        let (endpoint, _) = spawn_endpoint(AxumStatus::ACCEPTED).await;
        let notifier = NotifierService::new(notifier_config(endpoint)).unwrap();
        assert!(notifier.post_status("hello").await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = NotifierService::new(notifier_config(format!(
            "http://{addr}/1.1/statuses/update.json"
        )))
        .unwrap();
        let err = notifier.post_status("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
