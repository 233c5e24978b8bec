use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::sleep;

use crate::api::{SwapSubmitOutcome, TradeApi};
use crate::chain::{ChainRegistry, PollError};
use crate::entity::{BotError, SwapJob, SwapStatus};
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::view;

/// Tuning for the swap pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub queue_capacity: usize,
    pub worker_count: usize,
    /// How long a submission may wait for queue space before failing.
    pub enqueue_grace: Duration,
    /// Pause before refreshing the position after a confirmed trade.
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            worker_count: 5,
            enqueue_grace: Duration::from_millis(100),
            settle_delay: Duration::from_secs(3),
        }
    }
}

/// Executes confirmed swap intents: a bounded job queue drained by a fixed
/// worker pool, with each job driven through its phases to exactly one
/// terminal notification.
///
/// Phases of one job run sequentially inside the worker that pulled it; the
/// queue only ever sees whole jobs, so a job can never be processed by two
/// workers at once.
pub struct SwapPipeline {
    queue_tx: mpsc::Sender<SwapJob>,
    queue_rx: Arc<Mutex<mpsc::Receiver<SwapJob>>>,
    shutdown_tx: watch::Sender<bool>,
    inner: Arc<PipelineInner>,
    config: PipelineConfig,
}

impl SwapPipeline {
    pub fn new(
        config: PipelineConfig,
        api: Arc<dyn TradeApi>,
        chains: Arc<ChainRegistry>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            queue_tx,
            queue_rx: Arc::new(Mutex::new(queue_rx)),
            shutdown_tx,
            inner: Arc::new(PipelineInner {
                api,
                chains,
                notifier,
                sessions,
                settle_delay: config.settle_delay,
            }),
            config,
        }
    }

    /// Spawns the worker pool. Workers are homogeneous: any worker handles
    /// any phase of any job.
    pub fn start(&self) {
        for worker_id in 0..self.config.worker_count {
            let queue_rx = self.queue_rx.clone();
            let mut shutdown_rx = self.shutdown_tx.subscribe();
            let inner = self.inner.clone();

            tokio::spawn(async move {
                info!("swap worker {} started and watching queue", worker_id);
                loop {
                    // A worker mid-job is not interrupted; shutdown is only
                    // observed between queue pulls.
                    let job = tokio::select! {
                        job = async { queue_rx.lock().await.recv().await } => match job {
                            Some(job) => job,
                            None => break,
                        },
                        _ = shutdown_rx.changed() => break,
                    };
                    inner.run(job).await;
                }
                info!("swap worker {} shutting down", worker_id);
            });
        }
    }

    /// Enqueues a job with the given status, failing fast under backpressure.
    ///
    /// Waits at most the configured grace window for queue space; a saturated
    /// queue yields [`BotError::QueueFull`], which callers must surface as
    /// "try again" instead of dropping the trade intent silently.
    pub async fn submit(&self, mut job: SwapJob, status: SwapStatus) -> Result<(), BotError> {
        job.status = status;
        let chat_id = job.chat_id;

        match self.queue_tx.try_send(job) {
            Ok(()) => {
                info!("swap for chat {} added to queue", chat_id);
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(BotError::PipelineStopped),
            Err(TrySendError::Full(job)) => {
                warn!("swap queue full for chat {}, retrying...", chat_id);
                match self
                    .queue_tx
                    .send_timeout(job, self.config.enqueue_grace)
                    .await
                {
                    Ok(()) => {
                        info!("swap for chat {} added to queue after retry", chat_id);
                        Ok(())
                    }
                    Err(SendTimeoutError::Closed(_)) => Err(BotError::PipelineStopped),
                    Err(SendTimeoutError::Timeout(_)) => {
                        error!("failed to add swap to queue for chat {}", chat_id);
                        Err(BotError::QueueFull)
                    }
                }
            }
        }
    }

    /// Signals workers to stop once their current job completes.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

struct PipelineInner {
    api: Arc<dyn TradeApi>,
    chains: Arc<ChainRegistry>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<SessionStore>,
    settle_delay: Duration,
}

impl PipelineInner {
    /// Drives one job through its phases until a handler returns no successor.
    async fn run(&self, mut job: SwapJob) {
        loop {
            debug!(
                "dispatching swap for chat {} in phase {:?}",
                job.chat_id, job.status
            );
            let next = match job.status {
                SwapStatus::Processing => self.handle_processing(&mut job).await,
                SwapStatus::Success => self.handle_success(&job).await,
                SwapStatus::Failed => self.handle_failed(&job).await,
            };
            match next {
                Some(status) => job.status = status,
                None => break,
            }
        }
    }

    /// Submits the swap to the backend and blocks on on-chain confirmation.
    async fn handle_processing(&self, job: &mut SwapJob) -> Option<SwapStatus> {
        let outcome = match self.api.submit_swap(&job.request, &job.profile).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("backend swap submit failed for chat {}: {}", job.chat_id, e);
                return Some(SwapStatus::Failed);
            }
        };

        let tx = match outcome {
            SwapSubmitOutcome::SoftReject { message } => {
                // The backend took the call but declined the trade; nothing
                // happened on-chain, so this is not a failure.
                self.notify(job.chat_id, &message).await;
                return None;
            }
            SwapSubmitOutcome::Accepted { tx } => tx,
        };

        let chain_code = job.profile.chain_code_for_wallet(&job.request.wallet_id);

        let pending = view::pending_text(chain_code.as_deref().unwrap_or(""), &tx);
        self.notify_html(job.chat_id, &pending).await;

        let chain_code = match chain_code {
            Some(code) => code,
            None => {
                // The wallet is not in the user's wallet set; a data problem,
                // not something another attempt could fix.
                error!(
                    "{} (wallet {}, chat {})",
                    BotError::ChainUnresolved,
                    job.request.wallet_id,
                    job.chat_id
                );
                self.notify(job.chat_id, "Something went wrong, please contact support")
                    .await;
                return None;
            }
        };

        match self.chains.poll_transaction(&chain_code, &tx).await {
            Ok(()) => {
                job.tx = Some(tx);
                Some(SwapStatus::Success)
            }
            Err(e @ PollError::MaxRetriesExceeded) => {
                // The trade's fate is left to the backend's own history.
                self.notify(job.chat_id, &e.to_string()).await;
                None
            }
            Err(e) => {
                error!("transaction poll failed for chat {}: {}", job.chat_id, e);
                None
            }
        }
    }

    /// Terminal success path: notify, refresh the position view, pin it.
    async fn handle_success(&self, job: &SwapJob) -> Option<SwapStatus> {
        let link = job
            .tx
            .as_deref()
            .and_then(|tx| view::explorer_link(&job.wallet.chain_code, tx))
            .unwrap_or_default();
        let text = format!("{}{}", view::trade_success_text(job), link);
        self.notify_html(job.chat_id, &text).await;

        // Give the backend a moment to pick up the fill before refreshing.
        sleep(self.settle_delay).await;

        let position = match self
            .api
            .get_position(
                &job.wallet.address,
                &job.base_token.address,
                &job.wallet.chain_code,
                &job.profile,
            )
            .await
        {
            Ok(position) => position,
            Err(e) => {
                error!("position refresh failed for chat {}: {}", job.chat_id, e);
                return None;
            }
        };

        // Without a prior trade prompt there is nothing to refresh.
        if self.sessions.last_swap_message(job.chat_id).await.is_none() {
            return None;
        }

        let stale = self.sessions.take_wait_clean(job.chat_id).await;
        if !stale.is_empty() {
            if let Err(e) = self.notifier.delete_messages(job.chat_id, &stale).await {
                error!(
                    "failed to clean up stale messages for chat {}: {}",
                    job.chat_id, e
                );
            }
        }

        let rendered = view::render_position(&position);
        let message_id = match self.notifier.send_html(job.chat_id, &rendered).await {
            Ok(id) => id,
            Err(e) => {
                error!("failed to send position view to chat {}: {}", job.chat_id, e);
                return None;
            }
        };
        self.sessions
            .set_last_swap_message(job.chat_id, message_id)
            .await;

        if let Err(e) = self.notifier.pin_message(job.chat_id, message_id).await {
            error!("failed to pin position view for chat {}: {}", job.chat_id, e);
        }

        None
    }

    /// Terminal failure path; notification only, no further backend calls.
    async fn handle_failed(&self, job: &SwapJob) -> Option<SwapStatus> {
        let text = format!("{}{}", view::trade_failed_text(job), view::SUPPORT_URL);
        self.notify_html(job.chat_id, &text).await;
        None
    }

    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.notifier.send_text(chat_id, text).await {
            error!("failed to notify chat {}: {}", chat_id, e);
        }
    }

    async fn notify_html(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.notifier.send_html(chat_id, text).await {
            error!("failed to notify chat {}: {}", chat_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::chain::{PollConfig, TxStatus, TxStatusChecker};
    use crate::entity::{
        Position, SwapRequest, TokenMeta, TradeDirection, UserProfile, Wallet,
    };

    const CHAT: i64 = 77;

    enum SubmitBehavior {
        Accept(&'static str),
        SoftReject(&'static str),
        Fail,
    }

    struct MockApi {
        behavior: SubmitBehavior,
        submit_calls: AtomicU32,
        position_calls: AtomicU32,
    }

    impl MockApi {
        fn new(behavior: SubmitBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                submit_calls: AtomicU32::new(0),
                position_calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TradeApi for MockApi {
        async fn submit_swap(
            &self,
            _swap: &SwapRequest,
            _profile: &UserProfile,
        ) -> Result<SwapSubmitOutcome, BotError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                SubmitBehavior::Accept(tx) => Ok(SwapSubmitOutcome::Accepted {
                    tx: tx.to_string(),
                }),
                SubmitBehavior::SoftReject(msg) => Ok(SwapSubmitOutcome::SoftReject {
                    message: msg.to_string(),
                }),
                SubmitBehavior::Fail => {
                    Err(BotError::BackendSubmit("backend down".to_string()))
                }
            }
        }

        async fn get_position(
            &self,
            _wallet_address: &str,
            _token_address: &str,
            _chain_code: &str,
            _profile: &UserProfile,
        ) -> Result<Position, BotError> {
            self.position_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Position {
                symbol: "PEPE".to_string(),
                chain_code: "SOLANA".to_string(),
                amount: "42".to_string(),
                ..Default::default()
            })
        }
    }

    struct ScriptedChecker {
        script: StdMutex<VecDeque<Result<TxStatus, PollError>>>,
        calls: AtomicU32,
    }

    impl ScriptedChecker {
        fn new(script: Vec<Result<TxStatus, PollError>>) -> Arc<Self> {
            Arc::new(Self {
                script: StdMutex::new(script.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TxStatusChecker for ScriptedChecker {
        async fn check(&self, _tx: &str) -> Result<TxStatus, PollError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(TxStatus::NotFound))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: StdMutex<Vec<String>>,
        deleted: StdMutex<Vec<i32>>,
        pinned: StdMutex<Vec<i32>>,
        next_id: AtomicI32,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }

        fn record(&self, text: &str) -> i32 {
            self.sent.lock().unwrap().push(text.to_string());
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_text(&self, _chat_id: i64, text: &str) -> Result<i32, BotError> {
            Ok(self.record(text))
        }

        async fn send_html(&self, _chat_id: i64, text: &str) -> Result<i32, BotError> {
            Ok(self.record(text))
        }

        async fn delete_messages(
            &self,
            _chat_id: i64,
            message_ids: &[i32],
        ) -> Result<(), BotError> {
            self.deleted.lock().unwrap().extend_from_slice(message_ids);
            Ok(())
        }

        async fn pin_message(&self, _chat_id: i64, message_id: i32) -> Result<(), BotError> {
            self.pinned.lock().unwrap().push(message_id);
            Ok(())
        }
    }

    fn test_job() -> SwapJob {
        let wallet = Wallet {
            wallet_id: "w1".to_string(),
            wallet_key: "k1".to_string(),
            address: "addr1".to_string(),
            chain_code: "SOLANA".to_string(),
        };
        let mut wallets = HashMap::new();
        wallets.insert("SOLANA".to_string(), vec![wallet.clone()]);

        SwapJob {
            status: SwapStatus::Processing,
            request: SwapRequest {
                amount: "1000000000".to_string(),
                wallet_id: "w1".to_string(),
                wallet_key: "k1".to_string(),
                from_token_address: "quote-addr".to_string(),
                from_token_decimals: 9,
                to_token_address: "base-addr".to_string(),
                to_token_decimals: 6,
                slippage: "0.01".to_string(),
                direction: TradeDirection::Buy,
                trade_type: "M".to_string(),
                price: String::new(),
                profit_flag: 0.0,
            },
            wallet,
            base_token: TokenMeta {
                symbol: "PEPE".to_string(),
                address: "base-addr".to_string(),
                ..Default::default()
            },
            quote_token: TokenMeta {
                symbol: "SOL".to_string(),
                address: "quote-addr".to_string(),
                ..Default::default()
            },
            chat_id: CHAT,
            profile: UserProfile {
                wallets,
                ..Default::default()
            },
            tx: None,
            display_amount: "1".to_string(),
        }
    }

    fn pipeline(
        api: Arc<MockApi>,
        checker: Arc<ScriptedChecker>,
        notifier: Arc<RecordingNotifier>,
        sessions: Arc<SessionStore>,
        config: PipelineConfig,
    ) -> SwapPipeline {
        let mut chains = ChainRegistry::new(PollConfig::default());
        chains.register("SOLANA", checker);
        SwapPipeline::new(config, api, Arc::new(chains), notifier, sessions)
    }

    #[tokio::test(start_paused = true)]
    async fn hard_backend_failure_notifies_once_without_polling() {
        let api = MockApi::new(SubmitBehavior::Fail);
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );

        p.inner.run(test_job()).await;

        let sent = notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("trade failed"));
        assert_eq!(checker.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn soft_reject_forwards_backend_message_and_stops() {
        let api = MockApi::new(SubmitBehavior::SoftReject("Amount below the minimum"));
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );

        p.inner.run(test_job()).await;

        let sent = notifier.messages();
        assert_eq!(sent, vec!["Amount below the minimum".to_string()]);
        assert_eq!(checker.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_swap_sends_pending_success_and_pinned_position() {
        let api = MockApi::new(SubmitBehavior::Accept("T123"));
        let checker = ScriptedChecker::new(vec![
            Ok(TxStatus::NotFound),
            Ok(TxStatus::NotFound),
            Ok(TxStatus::Confirmed),
        ]);
        let notifier = RecordingNotifier::new();
        let sessions = Arc::new(SessionStore::new());
        // Simulate the prior trade prompt the success phase refreshes.
        sessions.set_last_swap_message(CHAT, 7).await;

        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            sessions.clone(),
            PipelineConfig::default(),
        );

        p.inner.run(test_job()).await;

        let sent = notifier.messages();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains("Confirming on-chain"));
        assert!(sent[0].contains("T123"));
        assert!(sent[1].contains("trade succeeded"));
        assert!(sent[1].contains("T123"));
        assert!(sent[2].contains("PEPE"));

        assert_eq!(checker.calls(), 3);
        assert_eq!(api.position_calls.load(Ordering::SeqCst), 1);

        // The stale prompt was cleaned up and the fresh view pinned.
        assert_eq!(*notifier.deleted.lock().unwrap(), vec![7]);
        let position_view_id = 3;
        assert_eq!(*notifier.pinned.lock().unwrap(), vec![position_view_id]);
        assert_eq!(
            sessions.last_swap_message(CHAT).await.unwrap().message_id,
            position_view_id
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_swap_reports_check_history_after_budget() {
        let api = MockApi::new(SubmitBehavior::Accept("T456"));
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );

        p.inner.run(test_job()).await;

        let sent = notifier.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Confirming on-chain"));
        assert!(sent[1].contains("check your trade history"));
        assert!(!sent.iter().any(|m| m.contains("trade succeeded")));
        assert!(!sent.iter().any(|m| m.contains("trade failed")));
        assert_eq!(checker.calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn on_chain_failure_terminates_silently() {
        let api = MockApi::new(SubmitBehavior::Accept("T789"));
        let checker = ScriptedChecker::new(vec![Ok(TxStatus::Failed)]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );

        p.inner.run(test_job()).await;

        // Only the pending notice; unclassified poll outcomes are logged only.
        let sent = notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Confirming on-chain"));
    }

    #[tokio::test(start_paused = true)]
    async fn unresolved_chain_is_fatal_with_support_message() {
        let api = MockApi::new(SubmitBehavior::Accept("T000"));
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );

        let mut job = test_job();
        job.request.wallet_id = "unknown-wallet".to_string();
        p.inner.run(job).await;

        let sent = notifier.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Confirming on-chain"));
        assert!(sent[1].contains("contact support"));
        assert_eq!(checker.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_handler_is_idempotent() {
        let api = MockApi::new(SubmitBehavior::Fail);
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );

        let mut job = test_job();
        job.status = SwapStatus::Failed;
        p.inner.run(job.clone()).await;
        p.inner.run(job).await;

        assert_eq!(notifier.messages().len(), 2);
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn saturated_queue_rejects_within_grace_window() {
        let api = MockApi::new(SubmitBehavior::Fail);
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api,
            checker,
            notifier,
            Arc::new(SessionStore::new()),
            PipelineConfig {
                queue_capacity: 2,
                ..Default::default()
            },
        );

        // No workers started; nothing drains the queue.
        assert!(p.submit(test_job(), SwapStatus::Processing).await.is_ok());
        assert!(p.submit(test_job(), SwapStatus::Processing).await.is_ok());
        let err = p
            .submit(test_job(), SwapStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::QueueFull));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_is_never_dispatched_to_processing() {
        let api = MockApi::new(SubmitBehavior::Accept("T111"));
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker.clone(),
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );
        p.start();

        p.submit(test_job(), SwapStatus::Failed).await.unwrap();

        for _ in 0..100 {
            if !notifier.messages().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let sent = notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("trade failed"));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(checker.calls(), 0);

        p.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn workers_drain_jobs_submitted_through_the_queue() {
        let api = MockApi::new(SubmitBehavior::Fail);
        let checker = ScriptedChecker::new(vec![]);
        let notifier = RecordingNotifier::new();
        let p = pipeline(
            api.clone(),
            checker,
            notifier.clone(),
            Arc::new(SessionStore::new()),
            PipelineConfig::default(),
        );
        p.start();

        for _ in 0..3 {
            p.submit(test_job(), SwapStatus::Processing).await.unwrap();
        }

        for _ in 0..200 {
            if notifier.messages().len() == 3 {
                break;
            }
            tokio::task::yield_now().await;
        }

        // Each job ends in exactly one terminal notification.
        assert_eq!(notifier.messages().len(), 3);
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 3);

        p.shutdown();
    }
}
