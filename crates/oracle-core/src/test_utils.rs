//! Test doubles shared with downstream crates.
//!
//! Enabled with the `test-utils` feature.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::traits::Oracle;
use crate::types::{Consultation, ConsultationRequest, ConsultationResponse, Verdict};

/// An oracle that replays a fixed sequence of verdicts, then repeats the
/// last one. Records every request it sees.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Consultation>>,
    last: Mutex<Option<Consultation>>,
    seen: Mutex<Vec<ConsultationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    /// Replay `verdicts` with a generic reason
    pub fn new(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        Self::from_consultations(verdicts.into_iter().map(|verdict| {
            Consultation::primary(ConsultationResponse::new(
                "Scripted",
                verdict.to_string(),
                verdict,
                format!("scripted {}", verdict),
            ))
        }))
    }

    /// Always answer with `verdict`
    pub fn always(verdict: Verdict) -> Self {
        Self::new([verdict])
    }

    /// Replay full consultations, including degraded ones
    pub fn from_consultations(script: impl IntoIterator<Item = Consultation>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `consult` ran
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<ConsultationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn consult(&self, request: &ConsultationRequest) -> Consultation {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(consultation) => {
                *last = Some(consultation.clone());
                consultation
            }
            None => last.clone().unwrap_or_else(|| {
                Consultation::primary(ConsultationResponse::new(
                    "Scripted",
                    "",
                    Verdict::Inconclusive,
                    "script exhausted",
                ))
            }),
        }
    }

    fn describe(&self) -> String {
        "Scripted oracle".to_string()
    }
}
