use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use session_core::{Session, SessionConfig, SessionEvent, SessionRuntime};
use scriba_transcript::{
    AttributionRecord, BoxFuture, ClassifyError, Speaker, SpeakerClassifier, StreamFragment,
};
use scriba_typewriter::{DisplaySink, Typewriter, TypewriterConfig};
use tokio::io::AsyncBufReadExt;

struct TerminalSink;

impl DisplaySink for TerminalSink {
    fn render(&self, _slot_id: &str, text: &str) {
        print!("\r\x1b[2K{text}");
        let _ = std::io::stdout().flush();
    }
}

struct CliRuntime {
    typewriter: Typewriter,
}

impl SessionRuntime for CliRuntime {
    fn emit(&self, event: SessionEvent) {
        match &event {
            SessionEvent::TranscriptUpdated { snapshot, .. } => {
                self.typewriter.request("note", &render_lines(snapshot));
            }
            SessionEvent::ClassificationFailed { error, .. } => {
                eprintln!("\n[error] classification: {error}");
            }
            SessionEvent::Flushed { snapshot, .. } => {
                self.typewriter.request("note", &render_lines(snapshot));
            }
        }
    }
}

fn render_lines(snapshot: &scriba_transcript::TranscriptSnapshot) -> String {
    snapshot
        .records
        .iter()
        .map(|r| {
            let label = match r.speaker {
                Speaker::Doctor => "의사",
                Speaker::Patient => "환자",
                Speaker::Pending => "…",
            };
            format!("[{label}] {}", r.text)
        })
        .collect::<Vec<_>>()
        .join("  |  ")
}

/// Toy stand-in for the real classifier: questions and imperative-sounding
/// utterances go to the doctor, everything else to the patient.
struct HeuristicClassifier;

impl SpeakerClassifier for HeuristicClassifier {
    fn classify<'a>(
        &'a self,
        utterances: &'a [String],
        _context: &'a [AttributionRecord],
    ) -> BoxFuture<'a, Result<Vec<AttributionRecord>, ClassifyError>> {
        Box::pin(async move {
            // simulated provider latency so the pending suffix is visible
            tokio::time::sleep(Duration::from_millis(400)).await;
            Ok(utterances
                .iter()
                .map(|text| {
                    let speaker = if text.ends_with('?') || text.contains("보세요") {
                        Speaker::Doctor
                    } else {
                        Speaker::Patient
                    };
                    AttributionRecord::new(speaker, text.clone())
                })
                .collect())
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let typewriter = Typewriter::spawn(Arc::new(TerminalSink), TypewriterConfig::default());
    let runtime = Arc::new(CliRuntime { typewriter });

    let session = Session::spawn(
        runtime.clone(),
        Arc::new(HeuristicClassifier),
        SessionConfig::default(),
    )
    .await
    .expect("failed to spawn session");

    eprintln!("Session {} started.", session.session_id());
    eprintln!("Type utterances, one per line; EOF (Ctrl+D) stops and flushes.");
    eprintln!();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        session
            .fragment(StreamFragment::final_text(line))
            .expect("session closed");
    }

    eprintln!();
    eprintln!("Flushing...");
    let snapshot = session.flush().await.expect("flush failed");
    session.stop();

    // let the typewriter catch up with the terminal frame
    tokio::time::sleep(Duration::from_secs(2)).await;
    runtime.typewriter.shutdown().await;

    println!();
    println!();
    for record in &snapshot.records {
        let label = match record.speaker {
            Speaker::Doctor => "의사",
            Speaker::Patient => "환자",
            Speaker::Pending => "미정",
        };
        println!("{label}: {}", record.text);
    }
}
