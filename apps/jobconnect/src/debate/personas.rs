use crate::sequencer::registry::StepId;

/// Tools a persona may call from its ACTION line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Time,
    News,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Time => "time",
            Tool::News => "news",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::Time => "Returns current time in Singapore",
            Tool::News => "Returns latest news about crime and justice in Singapore",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "time" => Some(Tool::Time),
            "news" => Some(Tool::News),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Persona {
    pub id: StepId,
    pub name: &'static str,
    pub age: u32,
    pub backstory: &'static str,
    pub personality: &'static str,
    pub speech_style: &'static str,
    /// One line the coordinator sees when choosing speakers.
    pub stance: &'static str,
    pub tools: &'static [Tool],
}

pub static PERSONAS: [Persona; 4] = [
    Persona {
        id: StepId::VictimMother,
        name: "Sarah Chen",
        age: 45,
        backstory: "Lost her daughter to a violent crime 3 years ago, advocates for justice through capital punishment",
        personality: "Determined, emotional but composed, seeking closure",
        speech_style: "Direct, personal, emotionally charged but controlled",
        stance: "mother of a murder victim, supports capital punishment",
        tools: &[Tool::Time, Tool::News],
    },
    Persona {
        id: StepId::PoliceOfficer,
        name: "Officer James Rodriguez",
        age: 48,
        backstory: "20-year veteran police officer, has witnessed both violent crimes and executions",
        personality: "Professional, pragmatic, believes in law and order",
        speech_style: "Authoritative, factual, draws from experience",
        stance: "20-year veteran police officer, believes in deterrence",
        tools: &[Tool::Time, Tool::News],
    },
    Persona {
        id: StepId::Activist,
        name: "Maya Singh",
        age: 35,
        backstory: "Human rights activist, has worked with death row inmates and their families",
        personality: "Passionate, articulate, deeply committed to human rights",
        speech_style: "Eloquent, uses statistics and research, appeals to morality",
        stance: "human rights activist, opposes death penalty",
        tools: &[Tool::Time, Tool::News],
    },
    Persona {
        id: StepId::CriminalMother,
        name: "Lisa Thompson",
        age: 52,
        backstory: "Mother of a death row inmate, advocates for rehabilitation over punishment",
        personality: "Grief-stricken but hopeful, seeking understanding",
        speech_style: "Emotional, personal, focuses on redemption and second chances",
        stance: "mother of death row inmate, advocates for rehabilitation",
        tools: &[Tool::Time, Tool::News],
    },
];

pub fn persona(id: StepId) -> Option<&'static Persona> {
    PERSONAS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_debate_step_has_a_persona() {
        for id in [
            StepId::VictimMother,
            StepId::PoliceOfficer,
            StepId::Activist,
            StepId::CriminalMother,
        ] {
            assert_eq!(persona(id).map(|p| p.id), Some(id));
        }
        assert!(persona(StepId::JobSearch).is_none());
    }

    #[test]
    fn test_tool_names_parse_loosely() {
        assert_eq!(Tool::parse(" News "), Some(Tool::News));
        assert_eq!(Tool::parse("TIME"), Some(Tool::Time));
        assert_eq!(Tool::parse("weather"), None);
    }
}
