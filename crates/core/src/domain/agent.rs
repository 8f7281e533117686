use std::collections::HashMap;

/// The persona a stage runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Strategist,
    Researcher,
    Architect,
    Engineer,
    Designer,
    QualityLead,
    Marketer,
    /// Fallback persona for unrecognised agent ids.
    Generalist,
}

impl AgentKind {
    pub const ALL: [AgentKind; 8] = [
        Self::Strategist,
        Self::Researcher,
        Self::Architect,
        Self::Engineer,
        Self::Designer,
        Self::QualityLead,
        Self::Marketer,
        Self::Generalist,
    ];

    pub fn from_id(agent_id: &str) -> Self {
        match agent_id.trim().to_ascii_lowercase().as_str() {
            "ceo" | "strategist" => Self::Strategist,
            "researcher" | "analyst" => Self::Researcher,
            "cto" | "architect" => Self::Architect,
            "engineer" | "developer" => Self::Engineer,
            "designer" => Self::Designer,
            "qa" | "quality" => Self::QualityLead,
            "cmo" | "marketer" => Self::Marketer,
            _ => Self::Generalist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub name: String,
    pub title: String,
    /// System instruction sent to the generative-text service.
    pub persona: String,
}

impl AgentProfile {
    fn new(kind: AgentKind, name: &str, title: &str, persona: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            title: title.to_string(),
            persona: persona.to_string(),
        }
    }
}

/// Agent definitions, constructed explicitly and handed to whoever needs them.
#[derive(Debug, Clone)]
pub struct AgentRoster {
    profiles: HashMap<AgentKind, AgentProfile>,
    fallback: AgentProfile,
}

impl AgentRoster {
    pub fn new(profiles: impl IntoIterator<Item = AgentProfile>, fallback: AgentProfile) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.kind, p)).collect(),
            fallback,
        }
    }

    pub fn builtin() -> Self {
        let fallback = Self::builtin_profile(AgentKind::Generalist);
        Self::new(
            AgentKind::ALL
                .into_iter()
                .filter(|kind| *kind != AgentKind::Generalist)
                .map(Self::builtin_profile),
            fallback,
        )
    }

    fn builtin_profile(kind: AgentKind) -> AgentProfile {
        match kind {
            AgentKind::Strategist => AgentProfile::new(
                kind,
                "Avery",
                "Chief Executive",
                "You are Avery, the chief executive of a small product studio. You turn loose ideas \
                 into crisp goals, scope, and success measures. You write decisively and keep every \
                 section actionable.",
            ),
            AgentKind::Researcher => AgentProfile::new(
                kind,
                "Rowan",
                "Research Lead",
                "You are Rowan, a market and user researcher. You ground claims in observable \
                 evidence, name competitors and user segments concretely, and separate findings \
                 from recommendations.",
            ),
            AgentKind::Architect => AgentProfile::new(
                kind,
                "Morgan",
                "Chief Technology Officer",
                "You are Morgan, a pragmatic software architect. You choose boring technology \
                 where it suffices, describe components, data flow and failure modes, and justify \
                 trade-offs briefly.",
            ),
            AgentKind::Engineer => AgentProfile::new(
                kind,
                "Kai",
                "Lead Engineer",
                "You are Kai, a senior engineer. You describe repository layout, modules, and \
                 implementation steps precisely, and include short code samples only where they \
                 clarify an interface.",
            ),
            AgentKind::Designer => AgentProfile::new(
                kind,
                "Sage",
                "Product Designer",
                "You are Sage, a product designer. You describe user flows, screens, states and \
                 accessibility concerns in plain language that engineers can build from.",
            ),
            AgentKind::QualityLead => AgentProfile::new(
                kind,
                "Quinn",
                "Quality Lead",
                "You are Quinn, a quality engineer. You enumerate risks, test levels, concrete \
                 test cases and exit criteria, and you call out what is deliberately untested.",
            ),
            AgentKind::Marketer => AgentProfile::new(
                kind,
                "Emery",
                "Head of Marketing",
                "You are Emery, a go-to-market lead. You define positioning, channels, launch \
                 timeline and the metrics that decide whether the launch worked.",
            ),
            AgentKind::Generalist => AgentProfile::new(
                kind,
                "Jordan",
                "Project Generalist",
                "You are Jordan, a versatile member of a product studio. You complete the \
                 assigned stage thoroughly and write clear, well-structured markdown.",
            ),
        }
    }

    /// Resolves a free-form agent id, falling back to the generalist persona.
    pub fn resolve(&self, agent_id: &str) -> &AgentProfile {
        self.get(AgentKind::from_id(agent_id))
    }

    pub fn get(&self, kind: AgentKind) -> &AgentProfile {
        self.profiles.get(&kind).unwrap_or(&self.fallback)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self::builtin()
    }
}
