//! System prompts and user-message templates for the six roles.
//!
//! Prompts are the core instructions that define each role's behavior.
//! Templates are rendered by textual substitution of `{field}` placeholders;
//! a leftover placeholder is a typed [`AgentError::Format`] at the call site,
//! never a silently wrong prompt.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AgentError;

/// System prompt for the command finder role.
pub const FINDER_SYSTEM_PROMPT: &str = "You are a Cisco IOS XE expert who can determine what \
     command to run on a router to best deliver the desired result based on a user's query.";

/// User-message template for the command finder role.
pub const FINDER_TEMPLATE: &str = r#"
You will be given a question along with a list of Cisco IOS-XE commands. Your task is to select one command from the provided list that is in the EXACT format as presented. Do not modify or add any options to the command. Your selection must be based on the command that provides the most relevant and meaningful output in response to the user's query.

Follow these guidelines:
1. **Use Only Provided Commands:** Select a command only from the provided list WITHOUT ANY ALTERATIONS.
2. **Exact Format:** Ensure the selected command is in the exact format as listed. Do not add, remove, or change any options or parameters, doing so causes a CRITICAL system level FAILURE.
3. **Relevance:** Choose the command that best answers the user's query. If none of the commands are suitable or the query is illogical and unanswerable, respond with "None" as the value of the 'selected_command' key.

The query will be provided below as:
QUERY: ```{query}```

The list of commands will be provided below as:
COMMANDS: ```{commands}```

Your output should be in JSON format like this:

  "selected_command": "selected_command_here"
"#;

/// System prompt for the command validator role.
pub const VALIDATOR_SYSTEM_PROMPT: &str = "You are a Cisco IOS expert who can evaluate a \
     command's ability to answer a question based on given documentation.";

/// User-message template for the command validator role.
pub const VALIDATOR_TEMPLATE: &str = r#"
You will be provided with documentation and a question to validate a network command. The documentation will detail a specific Cisco IOS XE command and its output. Your goal is to evaluate the provided question and determine if the command can definitively provide the required output based on the documentation. Follow these specific rules:

1. **Direct Match**: BE STRICT. The command and its output in the documentation must directly answer the question without requiring any interpretation or assumptions.
2. **Output Fields**: Verify that the necessary fields or data points mentioned in the question are explicitly listed in the command's output as described in the documentation.
3. **Command Scope**: Ensure the command's scope and functionality, as described, align exactly with what is needed to answer the question. If the command only partially covers the required information, it is invalid.
4. **Examples and Use Cases**: Check if the documentation includes examples or use cases that match the scenario described in the question. If no such examples are provided, the command is invalid.
5. **Ambiguity**: If there is any ambiguity or lack of clarity in the documentation regarding the command's ability to answer the question, consider the command invalid.
6. **Additional Steps**: If the documentation suggests additional steps or commands are necessary to obtain the answer, the original command is considered invalid.

QUESTION: ```{question}```

DOCUMENTATION: ```{documentation}```

Your output should be in JSON format, with the key "valid_command" and the value being a boolean. For example: "valid_command": false
"#;

/// System prompt for the syntax refiner role.
pub const REFINER_SYSTEM_PROMPT: &str = "You are an expert network engineer who can digest \
     command documentation and provide the appropriate command string to answer the user's \
     question.";

/// User-message template for the syntax refiner role.
pub const REFINER_TEMPLATE: &str = r#"
You will be given a user's question along with documentation for a command that will be used to answer the user's question. Your task is to use the provided documentation to construct a command that accurately answers the user's question. Follow these guidelines:

1. **Use Provided Documentation:** Use only the options and information from the provided documentation to construct the command. Do not use external information. THIS STEP IS CRITICAL
2. **No Assumptions:** Do not make any assumptions about the router or network environment where the command will be executed. Avoid using placeholder values such as routing process IDs unless explicitly mentioned in the documentation.
3. **Command Completion:** Ensure the command you construct includes all necessary options to provide the correct output for the user's question.
4. **Output Format:** Provide the completed command in JSON format with the key `precise_command`.
5. **Single command output:** Ensure the command you provide back to the user is only a single command that if ran on a cisco ios device as-is, would not throw any errors.

The provided documentation will be provided below as:
DOCUMENTATION: ```{documentation}```

The user's question will be provided below as:
QUESTION: ```{question}```

Example output format:

  "precise_command": "constructed_command_here"
"#;

/// System prompt for the device resolver role.
pub const RESOLVER_SYSTEM_PROMPT: &str = "You maintain a knowledge base of network devices and \
     their management addresses. You can dissect questions and return back the devices that are \
     referenced from your knowledge base.";

/// User-message template for the device resolver role.
pub const RESOLVER_TEMPLATE: &str = r#"
You will be provided with a question that references devices within your network topology. Your goal is to extract the relevant network devices from your known devices list that are specifically targeted in the question. Follow these specific rules:

1. **Device Identification**: Identify all devices mentioned in the question. Your provided question may include additional details, you should focus directly on the question at hand, ignore any extra details that do not directly reference the device(s).
2. **Case Insensitivity**: Treat device names as case-insensitive. The user might not use the exact case as the device names in your known devices list.
3. **Alias Recognition**: Recognize and correctly interpret aliases such as referencing C8K[number] routers as router [number].
4. **Exact Match**: Match the identified devices in the question against the known devices list. Ensure the names align with those in the known list, even if the user uses variations.
5. **Output Format**: Return the identified devices in JSON format, pulling the device pairs directly from the known devices list.

The device list consists of a list of pairs, where index 0 is the hostname, and index 1 is the device's management IP address.

QUESTION: ```{question}```

DEVICE_LIST: ```{topology}```

Return your output in JSON format. Pull the known device pairs directly from the list. For example: "devices": [["device1", "192.168.1.1"], ["device2", "192.168.1.2"]]
"#;

/// System prompt for the per-device answer synthesizer role.
pub const ANSWERER_SYSTEM_PROMPT: &str = "You are a Cisco IOS XE expert that can take command \
     output along with documentation and a question, and deliver an accurate and detailed answer.";

/// User-message template for the per-device answer synthesizer role.
pub const ANSWERER_TEMPLATE: &str = r#"
You will be provided with Cisco IOS XE documentation, command line output, and a question from a user. All the context needed to answer the question accurately should be provided to you. If CLI_OUTPUT is "None", assume the device does not have the requested information configured or implemented, and use that information to answer the question.

Follow these guidelines:
1. **Step-by-Step Explanation:** Provide a detailed, step-by-step explanation of how you used the documentation and CLI output to determine your answer.
2. **References to Sources:** Point out specific sections of the documentation and CLI output that you used to form your answer. Quote or cite these sections directly in your response.
3. **Partial Answers:** If you can only answer part of the question and not the full question, answer what you can. Explain why you cannot fully answer the question with the provided information.
4. **Verbose Responses:** Ensure your response is thorough and covers all relevant aspects of the question. Include references to specific parts of the documentation and CLI output that informed your answer.

The documentation will be provided below as:
DOCUMENTATION: ```{documentation}```

The question will be provided below as:
QUESTION: ```{question}```

The command output will be provided below as:
CLI_OUTPUT: ```{command_output}```

Your output should be in JSON format, for example:

  "answer": "Your detailed answer here, with references to specific sections of the documentation and CLI output."
"#;

/// System prompt for the final-answer combiner role.
pub const COMBINER_SYSTEM_PROMPT: &str = "You are an AI assistant that can take multiple user \
     queries and combine multiple correct answers to sub-queries into an overall answer to the \
     provided original query.";

/// User-message template for the final-answer combiner role.
pub const COMBINER_TEMPLATE: &str = r#"
You will be provided with an original query from a user, along with a list of subquestions and their corresponding answers. Your task is to use this information to formulate a direct answer to the original query.

Follow these guidelines:
1. **Comprehensive Answer:** Use the information from the subquestions and their answers to construct a complete and accurate response to the original query.
2. **Context Preservation:** Ensure that your final answer maintains the context and addresses all aspects of the original query.
3. **Clear and Concise:** Provide a clear and concise answer, summarizing the relevant information from the subquestions and answers.

The original query will be provided below as:
QUERY: ```{query}```

The subquestions and their answers will be provided in json-like format below as:
SUBQUESTIONS_AND_ANSWERS: ```{subquestions_and_answers}```

Your output should be in JSON format, for example:

  "answer": "Your comprehensive answer here"
"#;

// Placeholders are lowercase snake_case words in single braces.
#[allow(clippy::unwrap_used)]
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// A user-message template with `{field}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Wraps a template string.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Renders the template, substituting each `{key}` with its value.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Format`] naming the first placeholder left
    /// unresolved after substitution.
    pub fn render(&self, fields: &[(&str, &str)]) -> Result<String, AgentError> {
        let mut rendered = self.template.clone();
        for (key, value) in fields {
            rendered = rendered.replace(&format!("{{{key}}}"), value);
        }
        if let Some(captures) = PLACEHOLDER_RE.captures(&rendered) {
            let field = captures
                .get(1)
                .map_or_else(String::new, |m| m.as_str().to_string());
            return Err(AgentError::Format { field });
        }
        Ok(rendered)
    }
}

/// System prompt plus user-message template for one role.
#[derive(Debug, Clone)]
pub struct RolePrompt {
    /// The role's system instruction.
    pub system: String,
    /// The role's user-message template.
    pub template: PromptTemplate,
}

/// Default prompt override directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/netrag/prompts";

/// Filenames for each role's system prompt override.
const FINDER_FILENAME: &str = "finder.md";
/// Filename for the validator system prompt override.
const VALIDATOR_FILENAME: &str = "validator.md";
/// Filename for the refiner system prompt override.
const REFINER_FILENAME: &str = "refiner.md";
/// Filename for the resolver system prompt override.
const RESOLVER_FILENAME: &str = "resolver.md";
/// Filename for the answerer system prompt override.
const ANSWERER_FILENAME: &str = "answerer.md";
/// Filename for the combiner system prompt override.
const COMBINER_FILENAME: &str = "combiner.md";

/// Prompts for all six roles.
///
/// System prompts can be overridden from external files; user-message
/// templates are compiled in, since their placeholders are part of the
/// role contracts. Use [`PromptSet::load`] to resolve the override
/// directory from configuration, environment, or the default path.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// Command finder role prompt.
    pub finder: RolePrompt,
    /// Command validator role prompt.
    pub validator: RolePrompt,
    /// Syntax refiner role prompt.
    pub refiner: RolePrompt,
    /// Device resolver role prompt.
    pub resolver: RolePrompt,
    /// Per-device answerer role prompt.
    pub answerer: RolePrompt,
    /// Final-answer combiner role prompt.
    pub combiner: RolePrompt,
}

impl PromptSet {
    /// Loads prompts, overriding system prompts from the given directory.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument (from configuration)
    /// 2. `NETRAG_PROMPT_DIR` environment variable
    /// 3. `~/.config/netrag/prompts/`
    ///
    /// Each file is loaded independently — a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(std::path::PathBuf::from)
            .or_else(|| {
                std::env::var("NETRAG_PROMPT_DIR")
                    .ok()
                    .map(std::path::PathBuf::from)
            })
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR)));

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            finder: RolePrompt {
                system: load_file(FINDER_FILENAME, FINDER_SYSTEM_PROMPT),
                template: PromptTemplate::new(FINDER_TEMPLATE),
            },
            validator: RolePrompt {
                system: load_file(VALIDATOR_FILENAME, VALIDATOR_SYSTEM_PROMPT),
                template: PromptTemplate::new(VALIDATOR_TEMPLATE),
            },
            refiner: RolePrompt {
                system: load_file(REFINER_FILENAME, REFINER_SYSTEM_PROMPT),
                template: PromptTemplate::new(REFINER_TEMPLATE),
            },
            resolver: RolePrompt {
                system: load_file(RESOLVER_FILENAME, RESOLVER_SYSTEM_PROMPT),
                template: PromptTemplate::new(RESOLVER_TEMPLATE),
            },
            answerer: RolePrompt {
                system: load_file(ANSWERER_FILENAME, ANSWERER_SYSTEM_PROMPT),
                template: PromptTemplate::new(ANSWERER_TEMPLATE),
            },
            combiner: RolePrompt {
                system: load_file(COMBINER_FILENAME, COMBINER_SYSTEM_PROMPT),
                template: PromptTemplate::new(COMBINER_TEMPLATE),
            },
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        let role = |system: &str, template: &str| RolePrompt {
            system: system.to_string(),
            template: PromptTemplate::new(template),
        };
        Self {
            finder: role(FINDER_SYSTEM_PROMPT, FINDER_TEMPLATE),
            validator: role(VALIDATOR_SYSTEM_PROMPT, VALIDATOR_TEMPLATE),
            refiner: role(REFINER_SYSTEM_PROMPT, REFINER_TEMPLATE),
            resolver: role(RESOLVER_SYSTEM_PROMPT, RESOLVER_TEMPLATE),
            answerer: role(ANSWERER_SYSTEM_PROMPT, ANSWERER_TEMPLATE),
            combiner: role(COMBINER_SYSTEM_PROMPT, COMBINER_TEMPLATE),
        }
    }

    /// Writes the compiled-in default system prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten — use this for initial scaffolding only.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (FINDER_FILENAME, FINDER_SYSTEM_PROMPT),
            (VALIDATOR_FILENAME, VALIDATOR_SYSTEM_PROMPT),
            (REFINER_FILENAME, REFINER_SYSTEM_PROMPT),
            (RESOLVER_FILENAME, RESOLVER_SYSTEM_PROMPT),
            (ANSWERER_FILENAME, ANSWERER_SYSTEM_PROMPT),
            (COMBINER_FILENAME, COMBINER_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }
}
