use llm::GenerationRequest;
use stagecraft_core::{AgentProfile, DeliverableKind, StageRequest};

pub struct StagePrompts;

const GENERIC_STATUS: &[&str] = &[
    "Reviewing the stage brief",
    "Drafting the main sections",
    "Adding supporting detail",
    "Tightening the structure",
    "Finishing the final section",
];

const GENERIC_COMPLETION: &str = r#"Complete this stage and write the outcome as a well-structured markdown document.
Use headings for the main sections, bullet lists for enumerations and short paragraphs.
End with a short list of open questions or next steps."#;

impl StagePrompts {
    /// System instruction for the agent running the stage.
    pub fn system_instruction(profile: &AgentProfile) -> String {
        format!(
            r#"{persona}

You are working as the {title} on a multi-stage product pipeline.
Write in markdown using only `#`, `##` and `###` headings, `-` bullet items,
numbered items, paragraphs, **bold**, *italic*, `code` and [links](https://example.com).
Do not use tables, block quotes or nested lists."#,
            persona = profile.persona,
            title = profile.title
        )
    }

    /// Stage prompt with the deliverable template, or the generic completion instruction.
    pub fn stage_prompt(
        request: &StageRequest,
        deliverable: Option<&DeliverableKind>,
        repository_url: Option<&str>,
    ) -> String {
        let instructions = deliverable
            .map(Self::deliverable_template)
            .unwrap_or(GENERIC_COMPLETION);

        let mut prompt = format!(
            r#"## Project
**Title:** {project_title}

## Stage {index}: {stage_name}
{stage_description}

## Instructions
{instructions}"#,
            project_title = request.project_title,
            index = request.stage_index + 1,
            stage_name = request.stage_name,
            stage_description = request.stage_description,
            instructions = instructions
        );

        if let Some(url) = repository_url {
            prompt.push_str(&format!(
                "\n\n## Repository\nThe project repository has been created at {url}. \
                 Reference it where the document describes code layout."
            ));
        }

        prompt
    }

    pub fn generation_request(
        profile: &AgentProfile,
        request: &StageRequest,
        deliverable: Option<&DeliverableKind>,
        repository_url: Option<&str>,
    ) -> GenerationRequest {
        GenerationRequest::new(
            Self::system_instruction(profile),
            Self::stage_prompt(request, deliverable, repository_url),
        )
    }

    pub fn deliverable_template(kind: &DeliverableKind) -> &'static str {
        match kind {
            DeliverableKind::ProjectBrief => {
                r#"Write a project brief with these sections:
# Project Brief
## Problem
## Target Users
## Goals and Success Metrics
## Scope (in and out)
## Risks and Assumptions"#
            }
            DeliverableKind::MarketResearch => {
                r#"Write a market research report with these sections:
# Market Research Report
## Market Overview
## Customer Segments
## Competitors (one bullet per competitor with strengths and gaps)
## Opportunities
## Recommendations"#
            }
            DeliverableKind::ProductStrategy => {
                r#"Write a product strategy with these sections:
# Product Strategy
## Vision
## Positioning
## Core Features (prioritised, numbered)
## Roadmap Milestones
## Metrics"#
            }
            DeliverableKind::TechnicalArchitecture => {
                r#"Write a technical architecture document with these sections:
# Technical Architecture
## System Overview
## Components
## Data Model
## Integrations
## Deployment
## Risks and Trade-offs"#
            }
            DeliverableKind::DesignSpec => {
                r#"Write a design specification with these sections:
# Design Specification
## Principles
## User Flows (numbered steps per flow)
## Screens and States
## Visual Language
## Accessibility"#
            }
            DeliverableKind::Codebase => {
                r#"Write a codebase overview with these sections:
# Codebase Overview
## Repository Layout
## Modules and Responsibilities
## Setup and Commands (use `code` for commands)
## Implementation Plan (numbered)
## Conventions"#
            }
            DeliverableKind::TestPlan => {
                r#"Write a test plan with these sections:
# Test Plan
## Scope
## Test Levels
## Test Cases (numbered, each with expected result)
## Environments and Data
## Exit Criteria"#
            }
            DeliverableKind::LaunchPlan => {
                r#"Write a launch plan with these sections:
# Launch Plan
## Positioning and Messaging
## Channels
## Timeline
## Launch Checklist
## Success Metrics"#
            }
            DeliverableKind::Other(_) => GENERIC_COMPLETION,
        }
    }

    /// Status lines shown as thoughts while content streams, in order.
    pub fn status_lines(deliverable: Option<&DeliverableKind>) -> &'static [&'static str] {
        match deliverable {
            Some(DeliverableKind::ProjectBrief) => &[
                "Clarifying the problem statement",
                "Identifying target users",
                "Setting goals and success metrics",
                "Drawing the scope boundaries",
                "Listing risks and assumptions",
            ],
            Some(DeliverableKind::MarketResearch) => &[
                "Sizing the market",
                "Segmenting customers",
                "Comparing competitors",
                "Looking for gaps and opportunities",
                "Writing recommendations",
            ],
            Some(DeliverableKind::ProductStrategy) => &[
                "Framing the product vision",
                "Working out positioning",
                "Prioritising core features",
                "Laying out roadmap milestones",
                "Choosing success metrics",
            ],
            Some(DeliverableKind::TechnicalArchitecture) => &[
                "Sketching the system overview",
                "Breaking the system into components",
                "Modelling the data",
                "Planning integrations",
                "Reviewing deployment and trade-offs",
            ],
            Some(DeliverableKind::DesignSpec) => &[
                "Setting design principles",
                "Mapping user flows",
                "Describing screens and states",
                "Defining the visual language",
                "Checking accessibility",
            ],
            Some(DeliverableKind::Codebase) => &[
                "Planning the repository layout",
                "Assigning module responsibilities",
                "Writing setup commands",
                "Sequencing the implementation",
                "Recording conventions",
            ],
            Some(DeliverableKind::TestPlan) => &[
                "Defining test scope",
                "Choosing test levels",
                "Writing test cases",
                "Describing environments and data",
                "Setting exit criteria",
            ],
            Some(DeliverableKind::LaunchPlan) => &[
                "Sharpening the message",
                "Selecting channels",
                "Building the timeline",
                "Assembling the launch checklist",
                "Picking success metrics",
            ],
            Some(DeliverableKind::Other(_)) | None => GENERIC_STATUS,
        }
    }
}
