//! Tool descriptors advertised to the model.
//!
//! Descriptors are built once at start-up and never change at runtime.
//! Each external collaborator owns a fixed group of tools; the memory tools
//! are served by the runtime itself (see [`crate::memory_tools`]).

use hearth_types::memory::MemoryCategory;
use hearth_types::tool::{ParamType, ToolDefinition, ToolParam};

/// External integrations that can be plugged into the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    /// Calendar events.
    Calendar,
    /// Reminders / to-dos.
    Reminders,
    /// Address book.
    Contacts,
    /// Email.
    Mail,
    /// Device location.
    Location,
}

impl Collaborator {
    /// Every collaborator.
    pub const ALL: [Collaborator; 5] = [
        Collaborator::Calendar,
        Collaborator::Reminders,
        Collaborator::Contacts,
        Collaborator::Mail,
        Collaborator::Location,
    ];

    /// The descriptors this collaborator serves.
    pub fn tools(&self) -> Vec<ToolDefinition> {
        match self {
            Collaborator::Calendar => calendar_tools(),
            Collaborator::Reminders => reminders_tools(),
            Collaborator::Contacts => contacts_tools(),
            Collaborator::Mail => mail_tools(),
            Collaborator::Location => location_tools(),
        }
    }
}

fn category_enum() -> ParamType {
    ParamType::Enum(
        MemoryCategory::ALL
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
    )
}

fn calendar_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "calendar_get_events",
            "List calendar events for a day or a range of days.",
        )
        .param(ToolParam::optional(
            "date",
            ParamType::String,
            "First day to list: 'today', 'tomorrow', or YYYY-MM-DD. Defaults to today.",
        ))
        .param(ToolParam::optional(
            "days",
            ParamType::Integer,
            "Number of days to include, starting at `date`. Defaults to 1.",
        )),
        ToolDefinition::new("calendar_create_event", "Create a calendar event.")
            .param(ToolParam::required("title", ParamType::String, "Event title"))
            .param(ToolParam::required(
                "start",
                ParamType::String,
                "Start time, ISO 8601 (e.g. 2026-10-17T15:00)",
            ))
            .param(ToolParam::optional(
                "end",
                ParamType::String,
                "End time, ISO 8601. Defaults to one hour after start.",
            ))
            .param(ToolParam::optional("location", ParamType::String, "Where"))
            .param(ToolParam::optional("notes", ParamType::String, "Free-form notes"))
            .param(ToolParam::optional(
                "all_day",
                ParamType::Boolean,
                "Whether this is an all-day event",
            )),
        ToolDefinition::new("calendar_delete_event", "Delete a calendar event by id.").param(
            ToolParam::required(
                "event_id",
                ParamType::String,
                "Identifier returned by calendar_get_events",
            ),
        ),
    ]
}

fn reminders_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("reminders_list", "List the user's reminders.").param(
            ToolParam::optional(
                "include_completed",
                ParamType::Boolean,
                "Also list completed reminders",
            ),
        ),
        ToolDefinition::new("reminders_create", "Create a reminder.")
            .param(ToolParam::required("title", ParamType::String, "What to be reminded of"))
            .param(ToolParam::optional(
                "due",
                ParamType::String,
                "When it is due, ISO 8601",
            ))
            .param(ToolParam::optional(
                "priority",
                ParamType::Enum(vec!["low".into(), "medium".into(), "high".into()]),
                "Priority",
            )),
        ToolDefinition::new("reminders_complete", "Mark a reminder as done.").param(
            ToolParam::required(
                "reminder_id",
                ParamType::String,
                "Identifier returned by reminders_list",
            ),
        ),
    ]
}

fn contacts_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("contacts_search", "Look up people in the address book.").param(
            ToolParam::required("query", ParamType::String, "Name, email, or phone fragment"),
        ),
    ]
}

fn mail_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("mail_search", "Search the user's email.")
            .param(ToolParam::required("query", ParamType::String, "Search terms"))
            .param(ToolParam::optional(
                "limit",
                ParamType::Integer,
                "Maximum messages to return. Defaults to 10.",
            )),
        ToolDefinition::new("mail_send", "Send an email on the user's behalf.")
            .param(ToolParam::required("to", ParamType::String, "Recipient address"))
            .param(ToolParam::required("subject", ParamType::String, "Subject line"))
            .param(ToolParam::required("body", ParamType::String, "Plain-text body")),
    ]
}

fn location_tools() -> Vec<ToolDefinition> {
    vec![ToolDefinition::new(
        "location_current",
        "Get the user's current approximate location.",
    )]
}

/// Tools served from the memory store.
pub fn memory_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "memory_save",
            "Remember a new fact about the user. Use memory_correct instead when it changes something already remembered.",
        )
        .param(ToolParam::required("content", ParamType::String, "The fact, as one sentence"))
        .param(ToolParam::required("category", category_enum(), "What kind of fact"))
        .param(ToolParam::optional(
            "subject",
            ParamType::String,
            "Comma-separated lowercase names of who or what it is about, e.g. 'adam,gabby'",
        )),
        ToolDefinition::new(
            "memory_correct",
            "Replace a remembered fact with a corrected version. The old version is kept for history.",
        )
        .param(ToolParam::required(
            "memory_id",
            ParamType::Integer,
            "Id of the memory being corrected (shown as [#id])",
        ))
        .param(ToolParam::required("new_content", ParamType::String, "The corrected fact"))
        .param(ToolParam::optional(
            "category",
            category_enum(),
            "Category of the corrected fact. Defaults to the old one.",
        ))
        .param(ToolParam::optional(
            "subject",
            ParamType::String,
            "New subject list. Defaults to the old one.",
        )),
        ToolDefinition::new(
            "memory_confirm",
            "Mark a remembered fact as still true when the user restates it.",
        )
        .param(ToolParam::required("memory_id", ParamType::Integer, "Id of the memory")),
        ToolDefinition::new(
            "memory_forget",
            "Permanently forget a memory. Only when the user explicitly asks.",
        )
        .param(ToolParam::required("memory_id", ParamType::Integer, "Id of the memory")),
        ToolDefinition::new("memory_search", "Search remembered facts by keyword.")
            .param(ToolParam::required("query", ParamType::String, "Keyword or phrase")),
        ToolDefinition::new(
            "memory_subjects",
            "List every person or thing that has memories filed under it.",
        ),
        ToolDefinition::new(
            "conversation_search",
            "Full-text search over past conversations with the user.",
        )
        .param(ToolParam::required("query", ParamType::String, "Words to look for")),
    ]
}
