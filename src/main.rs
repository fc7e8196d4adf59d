//! Demo CLI: resolves a single utterance against a small built-in tool
//! catalog and prints the result as JSON. Ships with a no-op model handle
//! that never produces a response, so what you see end to end is the
//! schema-driven extraction strategy (attempt 3) doing the work — useful
//! for poking at the extractor without wiring up a real inference runtime.

use clap::Parser;
use log::info;

use resolver_router::{resolve, CloudAdapter, CloudResponse, ModelHandle, ModelRequest};
use resolver_types::{ChatTurn, ParamType, ParameterSchema, Role, ToolSchema};

#[derive(Parser, Debug)]
#[command(name = "resolver_demo", about = "Hybrid function-call resolver demo")]
struct Args {
    /// The user utterance to resolve.
    #[arg(trailing_var_arg = true, required = true)]
    utterance: Vec<String>,
}

struct NullModel;

#[async_trait::async_trait]
impl ModelHandle for NullModel {
    async fn complete(&mut self, _request: ModelRequest<'_>) -> String {
        String::new()
    }

    async fn reset(&mut self) {}
}

struct UnconfiguredCloud;

#[async_trait::async_trait]
impl CloudAdapter for UnconfiguredCloud {
    async fn generate(&self, _messages: &[ChatTurn], _tools: &[ToolSchema]) -> Result<CloudResponse, String> {
        Err("no cloud adapter configured for this demo".to_string())
    }
}

fn demo_catalog() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_weather".into(),
            description: "get the current weather for a city".into(),
            parameters: vec![ParameterSchema {
                name: "location".into(),
                param_type: ParamType::String,
                description: "the city to check".into(),
            }],
            required: vec!["location".into()],
        },
        ToolSchema {
            name: "set_alarm".into(),
            description: "wake the user at a given time".into(),
            parameters: vec![
                ParameterSchema {
                    name: "hour".into(),
                    param_type: ParamType::Integer,
                    description: String::new(),
                },
                ParameterSchema {
                    name: "minute".into(),
                    param_type: ParamType::Integer,
                    description: String::new(),
                },
            ],
            required: vec!["hour".into(), "minute".into()],
        },
        ToolSchema {
            name: "create_reminder".into(),
            description: "remind the user to do something".into(),
            parameters: vec![
                ParameterSchema {
                    name: "title".into(),
                    param_type: ParamType::String,
                    description: "what to remind about".into(),
                },
                ParameterSchema {
                    name: "time".into(),
                    param_type: ParamType::String,
                    description: "when to remind".into(),
                },
            ],
            required: vec!["title".into()],
        },
        ToolSchema {
            name: "send_message".into(),
            description: "send a message to a recipient".into(),
            parameters: vec![
                ParameterSchema {
                    name: "recipient".into(),
                    param_type: ParamType::String,
                    description: "who receives it".into(),
                },
                ParameterSchema {
                    name: "message".into(),
                    param_type: ParamType::String,
                    description: "content of the message".into(),
                },
            ],
            required: vec!["recipient".into(), "message".into()],
        },
    ]
}

#[tokio::main]
async fn main() {
    if let Err(e) = resolver_router::logger::init() {
        eprintln!("Failed to set up logging: {e}");
    }

    let args = Args::parse();
    let utterance = args.utterance.join(" ");
    info!("resolving utterance: {utterance}");

    let turns = vec![ChatTurn {
        role: Role::User,
        content: utterance,
    }];
    let tools = demo_catalog();
    let mut model = NullModel;
    let cloud = UnconfiguredCloud;

    match resolve(&turns, &tools, 0.0, &mut model, &cloud).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
        Err(e) => {
            eprintln!("resolution failed: {e}");
            std::process::exit(1);
        }
    }
}
