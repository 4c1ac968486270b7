//! Tool and agent definitions handed to the hosting conversational runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{Config, config::AgentSettings, error::ToolError, lookup::WeatherLookup};

/// Tool definition in the function-calling schema most runtimes accept.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: serde_json::Value,
}

/// A capability the runtime can invoke with a JSON arguments string.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn name(&self) -> &str;

    async fn execute(&self, arguments: &str) -> Result<serde_json::Value, ToolError>;
}

pub const GET_WEATHER: &str = "get_weather";

#[derive(Debug, Deserialize)]
struct GetWeatherArgs {
    city: String,
}

/// `get_weather(city) -> {status, report}`.
#[derive(Debug)]
pub struct GetWeatherTool {
    lookup: WeatherLookup,
}

impl GetWeatherTool {
    pub fn new(lookup: WeatherLookup) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".into(),
            function: FunctionDefinition {
                name: GET_WEATHER.into(),
                description: "特定の都市、州、地域の現在の天気をお知らせします。大きな地域名でも対応可能です。"
                    .into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "天気を知りたい都市、州、地域の名前"
                        }
                    },
                    "required": ["city"]
                }),
            },
        }
    }

    fn name(&self) -> &str {
        GET_WEATHER
    }

    async fn execute(&self, arguments: &str) -> Result<serde_json::Value, ToolError> {
        let args: GetWeatherArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let report = self.lookup.get_weather(&args.city).await;
        Ok(serde_json::to_value(report)?)
    }
}

/// Serializable description of the agent: identity, instruction and tool schemas.
#[derive(Debug, Clone, Serialize)]
pub struct AgentDefinition {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub tools: Vec<ToolDefinition>,
}

/// An agent definition bound to the tools that back it.
pub struct Agent {
    settings: AgentSettings,
    tools: Vec<Arc<dyn Tool>>,
}

impl Agent {
    pub fn new(settings: AgentSettings) -> Self {
        Self {
            settings,
            tools: Vec::new(),
        }
    }

    /// The weather agent: configured identity plus the `get_weather` tool.
    pub fn weather(config: &Config) -> anyhow::Result<Self> {
        let lookup = WeatherLookup::from_config(config)?;
        Ok(Self::new(config.agent.clone()).with_tool(Arc::new(GetWeatherTool::new(lookup))))
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn definition(&self) -> AgentDefinition {
        AgentDefinition {
            name: self.settings.name.clone(),
            model: self.settings.model.clone(),
            instruction: self.settings.instruction.clone(),
            tools: self.tools.iter().map(|t| t.definition()).collect(),
        }
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Dispatch a tool call as the runtime would.
    pub async fn call(&self, name: &str, arguments: &str) -> Result<serde_json::Value, ToolError> {
        debug!(tool = name, arguments, "tool call");
        let tool = self.tool(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(arguments).await
    }
}
