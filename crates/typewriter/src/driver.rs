use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::board::{Board, Step, Submission};

/// Where animation frames land. One call per frame, full text each time —
/// the sink never has to reconstruct state from deltas.
pub trait DisplaySink: Send + Sync {
    fn render(&self, slot_id: &str, text: &str);
}

#[derive(Debug, Clone)]
pub struct TypewriterConfig {
    /// Delay between erase steps. Erasing reads faster than typing.
    pub erase_interval: Duration,
    /// Delay between type steps.
    pub type_interval: Duration,
    /// Changed-char count below which an edit is applied in one render
    /// instead of animated.
    pub min_animated_change: usize,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            erase_interval: Duration::from_millis(15),
            type_interval: Duration::from_millis(30),
            min_animated_change: 5,
        }
    }
}

/// Owns the single animation task and the shared [`Board`].
///
/// One driver serves all slots; animations for different slots run one at a
/// time in submission order. Requests never block — they update the board
/// and wake the task. Dropping the handle does not stop the task; call
/// [`Typewriter::shutdown`].
pub struct Typewriter {
    board: Arc<Mutex<Board>>,
    notify: Arc<Notify>,
    cancel: CancellationToken,
    config: TypewriterConfig,
    sink: Arc<dyn DisplaySink>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Typewriter {
    pub fn spawn(sink: Arc<dyn DisplaySink>, config: TypewriterConfig) -> Self {
        let board = Arc::new(Mutex::new(Board::new()));
        let notify = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let task = run(
            board.clone(),
            notify.clone(),
            cancel.clone(),
            config.clone(),
            sink.clone(),
        );
        let handle = tokio::spawn(task);

        Self {
            board,
            notify,
            cancel,
            config,
            sink,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Submit a new target text for a slot. Returns immediately; the
    /// animation happens on the driver task.
    pub fn request(&self, slot_id: &str, target: &str) {
        let submission =
            lock(&self.board).submit(slot_id, target, self.config.min_animated_change);
        match submission {
            Submission::Instant(text) => {
                self.sink.render(slot_id, &text);
            }
            Submission::Queued => {
                self.notify.notify_one();
            }
            Submission::Retargeted | Submission::Noop => {}
            Submission::ShrinkIgnored => {
                tracing::debug!(slot_id, "shrinking_target_ignored");
            }
        }
    }

    /// Drop all state for a slot, including any queued animation. The sink
    /// is not touched; the next request types from an empty field.
    pub fn reset_slot(&self, slot_id: &str) {
        lock(&self.board).reset(slot_id);
    }

    /// Stop the animation task mid-frame and wait for it to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn run(
    board: Arc<Mutex<Board>>,
    notify: Arc<Notify>,
    cancel: CancellationToken,
    config: TypewriterConfig,
    sink: Arc<dyn DisplaySink>,
) {
    loop {
        let next = lock(&board).next_slot();
        match next {
            Some(slot_id) => {
                if !animate(&board, &cancel, &config, sink.as_ref(), &slot_id).await {
                    return;
                }
            }
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = notify.notified() => {}
                }
            }
        }
    }
}

/// Animate one slot to convergence. Returns false on cancellation.
async fn animate(
    board: &Mutex<Board>,
    cancel: &CancellationToken,
    config: &TypewriterConfig,
    sink: &dyn DisplaySink,
    slot_id: &str,
) -> bool {
    loop {
        let step = lock(board).tick(slot_id);
        let interval = match step {
            Step::Erase(text) => {
                sink.render(slot_id, &text);
                config.erase_interval
            }
            Step::Type(text) => {
                sink.render(slot_id, &text);
                config.type_interval
            }
            Step::Done => return true,
        };

        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        renders: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        fn texts_for(&self, slot_id: &str) -> Vec<String> {
            self.renders
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == slot_id)
                .map(|(_, text)| text.clone())
                .collect()
        }

        fn count(&self) -> usize {
            self.renders.lock().unwrap().len()
        }
    }

    impl DisplaySink for RecordingSink {
        fn render(&self, slot_id: &str, text: &str) {
            self.renders
                .lock()
                .unwrap()
                .push((slot_id.to_string(), text.to_string()));
        }
    }

    fn animate_all() -> TypewriterConfig {
        TypewriterConfig {
            min_animated_change: 1,
            ..TypewriterConfig::default()
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn correction_erases_to_prefix_then_retypes() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), animate_all());

        tw.request("note", "안녕하세");
        settle().await;
        tw.request("note", "안녕하십니까");
        settle().await;

        let texts = sink.texts_for("note");
        assert_eq!(
            texts,
            [
                "안",
                "안녕",
                "안녕하",
                "안녕하세",
                // correction: erase one char, keep the common prefix, retype
                "안녕하",
                "안녕하십",
                "안녕하십니",
                "안녕하십니까",
            ]
        );

        tw.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn small_edit_renders_once_under_default_threshold() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), TypewriterConfig::default());

        // 4 changed chars < threshold 5: applied in one frame
        tw.request("note", "안녕하세");
        settle().await;
        tw.request("note", "안녕하십니까");
        settle().await;

        assert_eq!(sink.texts_for("note"), ["안녕하세", "안녕하십니까"]);

        tw.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn growing_targets_render_monotonically() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), animate_all());

        tw.request("note", "허리가");
        tw.request("note", "허리가 아파요");
        tw.request("note", "허리가 아파요 어제부터요");
        settle().await;

        let texts = sink.texts_for("note");
        assert_eq!(
            texts.last().map(String::as_str),
            Some("허리가 아파요 어제부터요")
        );
        let mut last = 0;
        for text in &texts {
            let chars = text.chars().count();
            assert!(chars >= last, "render shrank on pure growth: {texts:?}");
            last = chars;
        }

        tw.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_retargets_skip_intermediate_versions() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), animate_all());

        tw.request("note", "가나");
        settle().await;
        // two corrections faster than any animation frame
        tw.request("note", "가나다라");
        tw.request("note", "가나ABCD");
        settle().await;

        let texts = sink.texts_for("note");
        assert_eq!(texts.last().map(String::as_str), Some("가나ABCD"));
        // the superseded middle target never appears as a frame
        assert!(!texts.contains(&"가나다라".to_string()));
        assert!(!texts.contains(&"가나다".to_string()));

        tw.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_target_changes_nothing_until_reset() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), animate_all());

        tw.request("note", "안녕하십니까");
        settle().await;
        let before = sink.count();

        tw.request("note", "안녕");
        settle().await;
        assert_eq!(sink.count(), before, "shrink must not render");

        tw.reset_slot("note");
        tw.request("note", "안녕");
        settle().await;
        assert_eq!(sink.texts_for("note").last().map(String::as_str), Some("안녕"));

        tw.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn slots_do_not_interleave_text() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), animate_all());

        tw.request("doctor", "어디가 아프세요");
        tw.request("patient", "무릎이요");
        settle().await;

        assert_eq!(
            sink.texts_for("doctor").last().map(String::as_str),
            Some("어디가 아프세요")
        );
        assert_eq!(
            sink.texts_for("patient").last().map(String::as_str),
            Some("무릎이요")
        );

        tw.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_mid_animation() {
        let sink = Arc::new(RecordingSink::default());
        let tw = Typewriter::spawn(sink.clone(), animate_all());

        tw.request("note", "이 문장은 끝까지 타이핑되지 않습니다");
        tokio::time::sleep(Duration::from_millis(90)).await;
        tw.shutdown().await;

        let at_shutdown = sink.count();
        assert!(at_shutdown > 0, "some frames should have rendered");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.count(), at_shutdown, "no frames after shutdown");
    }
}
