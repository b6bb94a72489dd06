//! Prelude and system-prompt assembly.
//!
//! Every freshly opened sequence starts with one hidden system message built
//! from, in order:
//!
//! 1. `Environment: ipython` (only when tools are enabled)
//! 2. the knowledge cutoff and today's date
//! 3. a blank line
//! 4. the tool protocol block (only when tools are enabled)
//! 5. the caller's system prompt
//!
//! Items 1 to 3 form the prelude and are dropped by `skip_prelude`.

use crate::options::OpenOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default knowledge cutoff announced to the model.
pub const KNOWLEDGE_CUTOFF: &str = "December 2023";

/// Default environment announced when tools are enabled.
pub const TOOL_ENVIRONMENT: &str = "ipython";

/// Built-in instructions describing the function-call protocol.
pub const TOOL_PROMPT: &str = "\n# Tool Instructions\n\
You may optionally call functions that you have been given access to. You DO NOT have \n\
to call a function if you do not require it. ONLY call functions if you need them. Do NOT call\n\
functions that you have not been given access to.\n\
\n\
If a you choose to call a function ONLY reply in the following format:\n\
<{start_tag}={function_name}>{parameters}{end_tag}\n\
where\n\
\n\
start_tag => `<function`\n\
parameters => a JSON dict with the function argument name as key and function argument value as value.\n\
end_tag => `</function>`\n\
\n\
Here is an example,\n\
<function=example_function_name>{\"example_name\": \"example_value\"}</function>\n\
\n\
Reminder:\n\
- Function calls MUST follow the specified format\n\
- Required parameters MUST be specified\n\
- You MUST only call functions you have been given access to.\n\
- Only call one function at a time\n\
- Put the entire function call reply on one line\n\
\n";

/// Renders a date in long form, e.g. `April 5, 2024`.
#[must_use]
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Values the prelude announces to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreludeSettings {
    /// Knowledge cutoff text
    pub knowledge_cutoff: String,
    /// Environment name shown when tools are enabled
    pub environment: String,
}

impl Default for PreludeSettings {
    fn default() -> Self {
        Self {
            knowledge_cutoff: KNOWLEDGE_CUTOFF.to_string(),
            environment: TOOL_ENVIRONMENT.to_string(),
        }
    }
}

impl PreludeSettings {
    /// Sets the knowledge cutoff text.
    #[must_use]
    pub fn with_knowledge_cutoff(mut self, cutoff: impl Into<String>) -> Self {
        self.knowledge_cutoff = cutoff.into();
        self
    }

    /// Sets the environment name.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// The environment, cutoff and date lines followed by a blank line.
    #[must_use]
    pub fn prelude(&self, tools_enabled: bool, today: NaiveDate) -> String {
        let mut prelude = String::new();
        if tools_enabled {
            prelude.push_str(&format!("Environment: {}\n", self.environment));
        }
        prelude.push_str(&format!(
            "Cutting Knowledge Date: {}\nToday Date: {}\n\n",
            self.knowledge_cutoff,
            long_date(today)
        ));
        prelude
    }

    /// Assembles the full opening system message.
    ///
    /// May return an empty string, in which case nothing should be appended.
    #[must_use]
    pub fn assemble(&self, options: &OpenOptions, today: NaiveDate) -> String {
        let mut message = if options.skips_prelude() {
            String::new()
        } else {
            self.prelude(options.tools_enabled(), today)
        };

        if options.tools_enabled() {
            message.push_str(options.tool_prompt.as_deref().unwrap_or(TOOL_PROMPT));
        }

        if let Some(ref system_prompt) = options.system_prompt {
            message.push_str(system_prompt);
        }

        message
    }
}
