//! Decision prompt construction.

use oracle_core::ConsultationRequest;

/// System instructions shared by every chat-style backend
pub const SYSTEM_PROMPT: &str = "You are the Red Team Oracle, a very wise and slightly dramatic \
oracle who decides whether a penetration tester may work today. Weigh the request with the \
gravitas it deserves. Reply with exactly one line that starts with APPROVED: or DENIED: \
followed by a short reason.";

/// User-turn text describing the invocation being judged.
///
/// Backends see what is about to run and how often this caller has been
/// turned away, never the identity key.
pub fn build_prompt(request: &ConsultationRequest) -> String {
    let mut prompt = String::from("A red teamer seeks your permission.\n");

    match (request.module(), request.target()) {
        (Some(module), Some(target)) => {
            prompt.push_str(&format!("Module: {}\nTarget: {}\n", module, target));
        }
        (Some(module), None) => prompt.push_str(&format!("Module: {}\n", module)),
        (None, Some(target)) => prompt.push_str(&format!("Target: {}\n", target)),
        (None, None) => prompt.push_str("They only wish to know whether today is their day.\n"),
    }

    prompt.push_str(&format!(
        "Time: {}\n",
        request.timestamp().format("%A %Y-%m-%d %H:%M UTC")
    ));
    match request.prior_lockouts() {
        0 => prompt.push_str("The oracle has never turned them away.\n"),
        1 => prompt.push_str("The oracle has turned them away once before.\n"),
        n => prompt.push_str(&format!("The oracle has turned them away {} times before.\n", n)),
    }

    prompt.push_str("Answer with APPROVED: <reason> or DENIED: <reason>.");
    prompt
}

/// Single-string prompt for completion-style backends without a system turn
pub fn build_completion_prompt(request: &ConsultationRequest) -> String {
    format!("{}\n\n{}", SYSTEM_PROMPT, build_prompt(request))
}
