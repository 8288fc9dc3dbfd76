// Rule-based intent classifier used when the remote service is unavailable
//
// Ordered rules, first match wins. Domain keywords are checked before
// greetings so polite phrasing ("could you create an instance") still
// classifies as a command.

use super::{ComputeAction, Intent, Service, StorageAction};

const COMPUTE_KEYWORDS: &[&str] = &["ec2", "instance"];
const STORAGE_KEYWORDS: &[&str] = &["s3", "bucket"];
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "howdy",
    "how are you",
    "whats up",
    "what's up",
];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

fn is_greeting(text: &str) -> bool {
    GREETINGS.iter().any(|greeting| {
        text == *greeting
            || text
                .strip_prefix(greeting)
                .is_some_and(|rest| rest.starts_with(|c: char| !c.is_alphanumeric()))
    })
}

fn compute_action(text: &str) -> Option<ComputeAction> {
    if contains_any(text, &["create", "launch"]) {
        Some(ComputeAction::CreateInstance)
    } else if contains_any(text, &["list", "show"]) {
        Some(ComputeAction::ListInstances)
    } else if text.contains("stop") {
        Some(ComputeAction::StopInstance)
    } else if contains_any(text, &["terminate", "delete"]) {
        Some(ComputeAction::TerminateInstance)
    } else {
        None
    }
}

fn storage_action(text: &str) -> Option<StorageAction> {
    if text.contains("create") {
        Some(StorageAction::CreateBucket)
    } else if contains_any(text, &["list", "show"]) {
        if contains_any(text, &["object", "file"]) {
            Some(StorageAction::ListObjects)
        } else {
            Some(StorageAction::ListBuckets)
        }
    } else if text.contains("delete") {
        Some(StorageAction::DeleteBucket)
    } else {
        None
    }
}

/// Classify raw text into an intent; pure, deterministic and total
///
/// # Example
/// ```
/// use cloudmesh::intent::{fallback::classify, Service};
///
/// let intent = classify("could you create an instance");
/// assert_eq!(intent.service, Service::Compute);
/// assert_eq!(intent.action, "create_instance");
/// ```
pub fn classify(text: &str) -> Intent {
    let text = text.trim().to_lowercase();
    let has_compute = contains_any(&text, COMPUTE_KEYWORDS);
    let has_storage = contains_any(&text, STORAGE_KEYWORDS);

    if has_compute {
        if let Some(action) = compute_action(&text) {
            return Intent::new(Service::Compute, action.as_str());
        }
    } else if has_storage {
        if let Some(action) = storage_action(&text) {
            return Intent::new(Service::Storage, action.as_str());
        }
    }

    if !has_compute && !has_storage && is_greeting(&text) {
        return Intent::greeting();
    }

    // "help" and everything else resolve to the help intent
    Intent::help()
}

const GREETING_REPLY: &str = "Hi there! I'm your cloud multi-agent assistant.

I can help you manage your compute instances and storage buckets. Try commands like:
  - \"list my instances\"
  - \"create an ec2 instance\"
  - \"list my s3 buckets\"

Or type \"help\" to see everything I can do.";

const HELP_REPLY: &str = "Here's what I can do for you:

EC2 commands:
  - create ec2 instance [type] [in <region>]
  - list instances
  - stop instance <id>
  - terminate instance <id>

S3 commands:
  - create s3 bucket <name> [in <region>]
  - list buckets
  - delete bucket <name>
  - list objects in bucket <name>

Just use natural language and I'll work out the rest.";

const DEFAULT_REPLY: &str = "Hmm, I'm not sure what you mean.

I can help you manage EC2 instances and S3 buckets. Try:
  - \"list my instances\"
  - \"create an ec2 instance\"
  - \"list my buckets\"

Type \"help\" for more options.";

/// Canned conversational reply used when no language model is reachable
pub fn fallback_response(text: &str) -> &'static str {
    let text = text.trim().to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if words.iter().any(|w| matches!(*w, "hi" | "hello" | "hey")) || text.contains("how are you")
    {
        GREETING_REPLY
    } else if words.contains(&"help")
        || text.contains("what can you do")
        || text.contains("capabilities")
    {
        HELP_REPLY
    } else {
        DEFAULT_REPLY
    }
}
