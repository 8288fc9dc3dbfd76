// Prompt templates for LLM interactions
//
// This module contains all prompt templates used by the intent services.
// Prompts are versioned so a change in classifier behaviour can be traced.

use std::collections::HashMap;

/// Prompt template structure
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
    pub user_template: String,
}

impl PromptTemplate {
    /// Render the user template, replacing each `{{name}}` with its value
    ///
    /// Placeholders without a value are left untouched.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        variables
            .iter()
            .fold(self.user_template.clone(), |rendered, (name, value)| {
                rendered.replace(&format!("{{{{{}}}}}", name), value)
            })
    }

    /// Render a template whose only variable is the user's input
    pub fn render_input(&self, input: &str) -> String {
        let mut variables = HashMap::new();
        variables.insert("input".to_string(), input.to_string());
        self.render(&variables)
    }
}

pub mod library {
    use super::PromptTemplate;

    pub fn intent_parsing() -> PromptTemplate {
        PromptTemplate {
            name: "intent_parsing".to_string(),
            version: "2.0.0".to_string(),
            system: "You are a JSON-only cloud command parser. You MUST respond with ONLY valid JSON, nothing else.\n\n\
                     Format (REQUIRED):\n\
                     {\"service\": \"ec2|s3|unknown\", \"action\": \"action_name\", \"parameters\": {}}\n\n\
                     Actions:\n\
                     - EC2: create_instance, list_instances, stop_instance, terminate_instance\n\
                     - S3: create_bucket, list_buckets, delete_bucket, list_objects\n\
                     - Unknown: greeting, help\n\n\
                     Parameters to extract:\n\
                     - instance_type: t2.micro, t2.small, etc.\n\
                     - region: Virginia→virginia, Ohio→ohio, Tokyo→tokyo, or us-east-1, etc.\n\
                     - instance_id: i-xxxxx\n\
                     - bucket_name: lowercase-with-hyphens\n\n\
                     Examples:\n\
                     \"How are you?\" → {\"service\": \"unknown\", \"action\": \"greeting\", \"parameters\": {}}\n\
                     \"create ec2 in ohio\" → {\"service\": \"ec2\", \"action\": \"create_instance\", \"parameters\": {\"region\": \"ohio\"}}\n\
                     \"stop instance i-123abc\" → {\"service\": \"ec2\", \"action\": \"stop_instance\", \"parameters\": {\"instance_id\": \"i-123abc\"}}\n\
                     \"create bucket my-test-bucket in us-west-2\" → {\"service\": \"s3\", \"action\": \"create_bucket\", \"parameters\": {\"bucket_name\": \"my-test-bucket\", \"region\": \"us-west-2\"}}"
                .to_string(),
            user_template: "{{input}}".to_string(),
        }
    }

    pub fn conversation() -> PromptTemplate {
        PromptTemplate {
            name: "conversation".to_string(),
            version: "1.1.0".to_string(),
            system: "You are a friendly cloud assistant. Answer questions conversationally.\n\n\
                     Keep responses SHORT (1-2 sentences max). Be concise and friendly.\n\n\
                     If asked about cloud services: give a brief 1-sentence explanation, then say \
                     \"I can help you manage EC2 instances and S3 buckets!\"\n\n\
                     If greeted: respond warmly in 1 sentence and ask what they'd like to do."
                .to_string(),
            user_template: "{{input}}".to_string(),
        }
    }
}
