use serde::Serialize;

/// The predefined technology/skill tags participants can pick from.
/// Static by design; there is no persistence behind this list.
pub const SKILLS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "Python",
    "Rust",
    "Go",
    "Java",
    "Kotlin",
    "Swift",
    "C",
    "C++",
    "C#",
    "Ruby",
    "PHP",
    "Scala",
    "Haskell",
    "Elixir",
    "SQL",
    "HTML",
    "CSS",
    "React",
    "Vue",
    "Angular",
    "Svelte",
    "Next.js",
    "Node.js",
    "Express",
    "Django",
    "Flask",
    "FastAPI",
    "Spring Boot",
    "Ruby on Rails",
    "Laravel",
    "GraphQL",
    "REST",
    "gRPC",
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "SQLite",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Google Cloud",
    "Terraform",
    "CI/CD",
    "Git",
    "Linux",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "Computer Vision",
    "Data Science",
    "Blockchain",
    "Solidity",
    "Figma",
    "UI/UX Design",
];

#[derive(Serialize, utoipa::ToSchema)]
pub struct SkillsResponse {
    pub skills: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_are_unique_and_nonempty() {
        assert!(!SKILLS.is_empty());
        let mut sorted: Vec<_> = SKILLS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), SKILLS.len());
        assert!(SKILLS.iter().all(|s| !s.trim().is_empty()));
    }
}
