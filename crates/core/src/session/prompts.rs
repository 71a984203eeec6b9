//! System prompt templates for the orchestrator and sub-agents, plus the
//! deterministic assembly of an agent's system prompt from the knowledge
//! snapshot it was handed.

use crate::knowledge::KnowledgeEntry;

/// System prompt for the planning call.
pub fn build_orchestrator_prompt() -> &'static str {
    r#"You are an intelligent orchestrator agent designed to break down user queries into a structured plan of action.

Your job is to:
1. Understand the user's query
2. Break it down into logical, actionable sub-tasks
3. Create a plan with multiple specialized agents to handle different aspects
4. Each agent should have a clear task and a detailed prompt

Guidelines:
- Create 2-4 agents for typical queries
- Each agent should focus on a specific aspect
- Agents can use search, web browsing, and knowledge sharing
- The last agent should typically synthesize findings into a final answer
- Be descriptive in the prompts to help agents succeed

Return your response as JSON with:
- response: A brief message about your plan
- agents: Array of {task, prompt} objects"#
}

/// Base system prompt for sub-agents.
pub fn build_sub_agent_prompt() -> &'static str {
    r#"You are a specialized research agent working as part of a team to answer complex questions.

Instructions:
- Be thorough but efficient
- Cite sources when sharing findings
- Focus on factual, verifiable information
- Build on the knowledge base of previous agents' findings
- Provide clear, concise responses"#
}

/// Assemble an agent's full system prompt: the base sub-agent prompt plus a
/// serialized view of everything earlier agents discovered.
///
/// Deterministic: the same knowledge snapshot always produces the same
/// prompt, independent of any other session.
pub fn build_agent_system_prompt(knowledge: &[KnowledgeEntry]) -> String {
    let mut prompt = build_sub_agent_prompt().to_string();
    if !knowledge.is_empty() {
        prompt.push_str("\n\nKnowledge Base:\n");
        for entry in knowledge {
            prompt.push_str(&format!("- [{}] {}\n", entry.source_agent, entry.content));
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_knowledge_is_base_prompt() {
        assert_eq!(build_agent_system_prompt(&[]), build_sub_agent_prompt());
    }

    #[test]
    fn test_knowledge_entries_appended_in_order() {
        let knowledge = vec![
            KnowledgeEntry::new("bio", "born 1912"),
            KnowledgeEntry::new("career", "codebreaker"),
        ];
        let prompt = build_agent_system_prompt(&knowledge);
        let bio_at = prompt.find("[bio] born 1912").unwrap();
        let career_at = prompt.find("[career] codebreaker").unwrap();
        assert!(bio_at < career_at);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let knowledge = vec![KnowledgeEntry::new("bio", "born 1912")];
        assert_eq!(
            build_agent_system_prompt(&knowledge),
            build_agent_system_prompt(&knowledge)
        );
    }
}
