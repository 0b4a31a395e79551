use std::{panic, time::Duration};

use ais_consumer::{LiveSnapshot, consumer::LiveSession, settings::Settings, startup::App};
use futures::{Future, TryStreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestHelper {
    pub ais_source: AisSource,
    pub session: LiveSession,
    pub state: watch::Receiver<LiveSnapshot>,
}

pub struct AisSource {
    out: Option<mpsc::Sender<Result<String, std::io::Error>>>,
}

pub async fn test<T, Fut>(test_closure: T)
where
    T: FnOnce(TestHelper) -> Fut + panic::UnwindSafe + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    test_with_settings(Settings::test_default(), test_closure).await
}

pub async fn test_with_settings<T, Fut>(settings: Settings, test_closure: T)
where
    T: FnOnce(TestHelper) -> Fut + panic::UnwindSafe + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let app = App::build(settings).await;

    let (sender, recv) = mpsc::channel(100);
    let receiver_stream = ReceiverStream::new(recv);
    let compat =
        tokio_util::compat::FuturesAsyncReadCompatExt::compat(receiver_stream.into_async_read());

    let session = app.run_test(compat);
    let state = session.subscribe();

    let helper = TestHelper {
        ais_source: AisSource { out: Some(sender) },
        session,
        state,
    };

    test_closure(helper).await;
}

impl TestHelper {
    /// Waits until a published snapshot satisfies `predicate`.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&LiveSnapshot) -> bool) -> LiveSnapshot {
        tokio::time::timeout(WAIT_TIMEOUT, self.state.wait_for(predicate))
            .await
            .expect("timed out waiting for live snapshot")
            .unwrap()
            .clone()
    }

    pub async fn wait_for_vessels(&mut self, count: usize) -> LiveSnapshot {
        self.wait_for(|s| s.vessels.len() == count).await
    }
}

impl AisSource {
    pub async fn send_json(&self, value: &Value) -> Result<(), SendError> {
        self.send_frame(&value.to_string()).await
    }

    pub async fn send_frame(&self, frame: &str) -> Result<(), SendError> {
        let mut val = frame.to_string();
        val.push('\n');
        let out = self.out.as_ref().ok_or(SendError)?;
        out.send(Ok(val)).await.map_err(|_| SendError)
    }

    /// Ends the stream as if the server hung up.
    pub fn close(&mut self) {
        self.out = None;
    }
}

#[derive(Debug)]
pub struct SendError;
