//! Prompt templates and reply post-processing
//!
//! Pure functions only: a task's structured input renders to one prompt
//! string, and task-specific replies are split into the pieces the pages
//! display. User text is always embedded verbatim.

use serde::{Deserialize, Serialize};

/// Marker opening the drafted ticket in a ticket reply
pub const FINAL_TICKET_MARKER: &str = "---FINAL SUPPORT TICKET---";

/// Marker opening the recommendations in a ticket reply
pub const RECOMMENDATIONS_MARKER: &str = "---RECOMMENDATIONS---";

/// Shown when a ticket reply carries no recommendations section
pub const NO_RECOMMENDATIONS: &str = "No recommendations provided. Consider adding more details \
such as reproduction steps, environment details, or error logs.";

/// Shown when ticket suggestions cannot be produced
pub const SUGGESTIONS_UNAVAILABLE: &str = "Unable to generate suggestions at this time.";

/// Translation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TranslationDirection {
    CorporateToNormal,
    NormalToCorporate,
}

/// Support ticket category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    #[default]
    Question,
    Bug,
    Request,
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IssueType::Question => "Question",
            IssueType::Bug => "Bug",
            IssueType::Request => "Request",
        };
        f.write_str(name)
    }
}

/// A task with its inputs, ready to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task<'a> {
    /// Free-form chat; the text is sent as-is
    Chat { text: &'a str },
    /// Next.js/Tailwind/TypeScript code generation
    Codegen { request: &'a str },
    Translate {
        text: &'a str,
        direction: TranslationDirection,
    },
    /// Plain-language policy with candid commentary
    Policy { text: &'a str },
    TicketSuggestions { description: &'a str },
    Ticket {
        issue_type: IssueType,
        urgency: u8,
        description: &'a str,
    },
}

impl Task<'_> {
    /// Fixed token budget of one-shot tasks; session tasks take theirs from
    /// the request
    pub fn max_tokens(&self) -> Option<u32> {
        match self {
            Task::Chat { .. } | Task::Codegen { .. } => None,
            Task::Translate { .. } | Task::Policy { .. } | Task::Ticket { .. } => Some(512),
            Task::TicketSuggestions { .. } => Some(256),
        }
    }

    pub fn render(&self) -> String {
        match *self {
            Task::Chat { text } => text.to_string(),
            Task::Codegen { request } => codegen_prompt(request),
            Task::Translate { text, direction } => translate_prompt(text, direction),
            Task::Policy { text } => policy_prompt(text),
            Task::TicketSuggestions { description } => suggestions_prompt(description),
            Task::Ticket {
                issue_type,
                urgency,
                description,
            } => ticket_prompt(issue_type, urgency, description),
        }
    }
}

fn codegen_prompt(request: &str) -> String {
    format!(
        "You are a code-generation AI for creating modern wab apps based on this tech stack:\n\
         - next.js\n\
         - tailwindcss\n\
         - typescript\n\
         \n\
         take in to consideration that the user will have his project up and running and do not add any more packages to the project\n\
         \n\
         User prompt:\n\
         {}",
        request
    )
    .trim()
    .to_string()
}

fn translate_prompt(text: &str, direction: TranslationDirection) -> String {
    match direction {
        TranslationDirection::CorporateToNormal => format!(
            "Translate the following corporate language text to a funny, everyday tone that is a bit direct and slightly rude. \
             Do not include any warnings, notes, or extra commentary \u{2013} only provide the translated text:\n\n\"{}\"",
            text
        ),
        TranslationDirection::NormalToCorporate => format!(
            "Translate the following everyday language text to formal, corporate language. \
             Do not include any warnings, notes, or extra commentary \u{2013} only provide the translated text:\n\n\"{}\"",
            text
        ),
    }
}

fn policy_prompt(text: &str) -> String {
    format!(
        "Simplify the following corporate policy into plain language, but also add a funny, brutally honest commentary \
         that reveals what's really going on behind the corporate jargon. Do not include any warnings, notes, or extra \
         commentary\u{2014}only the simplified text and its humorous, candid explanation:\n\n\"{}\"",
        text
    )
}

fn suggestions_prompt(description: &str) -> String {
    format!(
        "You are an AI that analyzes support ticket reports and suggests additional details that could improve their clarity.\n\
         Based on the description below, list at least one suggestion (e.g., \"provide detailed steps to reproduce the issue\" \
         or \"include environment details or error messages\") that would help create a more complete support ticket.\n\
         Description:\n\
         {}",
        description
    )
    .trim()
    .to_string()
}

fn ticket_prompt(issue_type: IssueType, urgency: u8, description: &str) -> String {
    format!(
        "You are an AI specialized in generating clear, well-organized support tickets.\n\
         Based solely on the user input below, produce two sections separated by the markers below:\n\
         {final_marker}\n\
         Generate a complete, formatted support ticket including:\n\
         \x20 \u{2022} Ticket Summary (a brief, clear title)\n\
         \x20 \u{2022} Detailed Description (explain the problem in plain language)\n\
         \x20 \u{2022} Steps to Reproduce (if available)\n\
         \x20 \u{2022} Impact (explain how the issue affects work or usage)\n\
         \x20 \u{2022} Additional Comments\n\
         \x20 \u{2022} Both the user's provided urgency rating and your computed urgency rating.\n\
         \x20 Analyze the context carefully: if the user's input is exaggerated (e.g. \"I can't do my job\") but the \
         description shows a less critical issue, adjust the computed rating accordingly.\n\
         {rec_marker}\n\
         List suggestions for additional details the reporter could add to improve the ticket's clarity \
         (e.g., reproduction steps, environment details, error messages, screenshots).\n\
         \n\
         User Details:\n\
         \x20 - Issue Type: {issue_type}\n\
         \x20 - User's Urgency Rating (1 = Minor, 5 = Critical): {urgency}\n\
         \x20 - Description: {description}\n\
         \n\
         Format your output in plain text using exactly the markers above.",
        final_marker = FINAL_TICKET_MARKER,
        rec_marker = RECOMMENDATIONS_MARKER,
        issue_type = issue_type,
        urgency = urgency,
        description = description,
    )
    .trim()
    .to_string()
}

/// Kind of a code-generation reply segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Plain,
    Code,
}

/// One displayable piece of a code-generation reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub content: String,
}

/// Split a reply on triple-backtick fences
///
/// Pieces at even positions are prose and pieces at odd positions are code.
/// Each piece is trimmed and blank pieces are dropped, so an unterminated
/// fence still yields its code.
pub fn parse_code_segments(reply: &str) -> Vec<Segment> {
    reply
        .split("```")
        .enumerate()
        .filter_map(|(index, part)| {
            let content = part.trim();
            if content.is_empty() {
                return None;
            }
            let kind = if index % 2 == 0 {
                SegmentKind::Plain
            } else {
                SegmentKind::Code
            };
            Some(Segment {
                kind,
                content: content.to_string(),
            })
        })
        .collect()
}

/// Drafted support ticket split out of a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDraft {
    pub final_ticket: String,
    pub recommendations: String,
}

/// Split a ticket reply at the recommendations marker
pub fn split_ticket(reply: &str) -> TicketDraft {
    let mut parts = reply.split(RECOMMENDATIONS_MARKER);
    let final_part = parts.next().unwrap_or_default();
    let rec_part = parts.next().unwrap_or_default().trim();

    let final_ticket = final_part
        .replacen(FINAL_TICKET_MARKER, "", 1)
        .trim()
        .to_string();
    let recommendations = if rec_part.is_empty() {
        NO_RECOMMENDATIONS.to_string()
    } else {
        rec_part.to_string()
    };

    TicketDraft {
        final_ticket,
        recommendations,
    }
}
