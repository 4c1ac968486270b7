//! Core library for the `weather-agent` tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Coordinate resolution against a geocoding service
//! - Current-conditions lookup and report formatting
//! - The `get_weather` tool and agent definition exposed to a conversational runtime
//!
//! It is used by `weather-agent-cli`, but can also be embedded by an agent host directly.

pub mod config;
pub mod error;
pub mod geocode;
pub mod lookup;
pub mod model;
pub mod tool;

pub use config::{AgentSettings, Config};
pub use error::{LookupError, ToolError};
pub use geocode::{Geocoder, GoogleGeocoder, Resolution};
pub use lookup::{Conditions, WeatherLookup};
pub use model::{Coordinates, PlaceQuery, ReportStatus, WeatherReport};
pub use tool::{Agent, AgentDefinition, GetWeatherTool, Tool, ToolDefinition};
