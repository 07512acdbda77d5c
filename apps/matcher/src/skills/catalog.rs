//! Skill Catalog: the reference list of recognized skills, grouped by category.
//!
//! Built once at startup and shared read-only; the lowercase lookup tables used by the
//! extractor are precomputed here.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::{info, warn};

use crate::models::skill::SkillCategory;
use crate::store::SkillStore;

pub struct SkillCatalog {
    categories: Vec<SkillCategory>,
    /// lowercase single-word skill → canonical name
    tokens: HashMap<String, String>,
    /// (lowercase phrase, canonical name) for skills that tokenization would split
    phrases: Vec<(String, String)>,
}

impl SkillCatalog {
    /// Builds the catalog, dropping duplicate skills. A skill belongs to the first
    /// category that lists it; comparisons are case-insensitive.
    pub fn new(categories: Vec<SkillCategory>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tokens = HashMap::new();
        let mut phrases = Vec::new();
        let mut cleaned = Vec::with_capacity(categories.len());

        for mut category in categories {
            let mut skills = Vec::with_capacity(category.skills.len());
            for skill in category.skills.drain(..) {
                let skill = skill.trim().to_string();
                if skill.is_empty() {
                    continue;
                }
                let lower = skill.to_lowercase();
                if !seen.insert(lower.clone()) {
                    warn!(
                        "Skill '{skill}' already belongs to another category; ignoring it in '{}'",
                        category.name
                    );
                    continue;
                }
                if is_phrase(&lower) {
                    phrases.push((lower, skill.clone()));
                } else {
                    tokens.insert(lower, skill.clone());
                }
                skills.push(skill);
            }
            category.skills = skills;
            cleaned.push(category);
        }

        Self {
            categories: cleaned,
            tokens,
            phrases,
        }
    }

    /// Loads categories from the store, seeding the defaults first when none exist.
    pub async fn load_or_seed(store: &dyn SkillStore) -> Result<Self> {
        let mut categories = store.list_categories().await?;
        if categories.iter().all(|c| c.skills.is_empty()) {
            info!("No skill categories stored; seeding defaults");
            categories = default_categories();
            for category in &categories {
                store.upsert_category(category).await?;
            }
        }

        let catalog = Self::new(categories);
        info!(
            "Loaded {} base skills for detection across {} categories",
            catalog.len(),
            catalog.categories().len()
        );
        Ok(catalog)
    }

    pub fn categories(&self) -> &[SkillCategory] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.tokens.len() + self.phrases.len()
    }

    /// Canonical name for a lowercase single-word token.
    pub fn lookup_token(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    /// `(lowercase phrase, canonical name)` pairs.
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.phrases.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

/// Skills with whitespace or punctuation ("Machine Learning", "C++", "Node.js") cannot be
/// matched token by token.
fn is_phrase(lower: &str) -> bool {
    lower.chars().any(|c| !c.is_alphanumeric())
}

pub fn default_categories() -> Vec<SkillCategory> {
    vec![
        SkillCategory::new(
            "programming_languages",
            "Programming Languages",
            &[
                "Python", "JavaScript", "Java", "C++", "C#", "Ruby", "PHP", "Swift", "Go",
                "Kotlin", "TypeScript", "Rust", "Scala", "R",
            ],
        ),
        SkillCategory::new(
            "web_technologies",
            "Web Technologies",
            &[
                "HTML", "CSS", "React", "Angular", "Vue.js", "Node.js", "Express", "Django",
                "Flask", "Spring Boot", "ASP.NET", "Ruby on Rails",
            ],
        ),
        SkillCategory::new(
            "data_science",
            "Data Science & AI",
            &[
                "Machine Learning", "Deep Learning", "NLP", "Computer Vision", "TensorFlow",
                "PyTorch", "Keras", "scikit-learn", "Pandas", "NumPy", "Data Mining",
                "Statistical Analysis", "Big Data", "Data Visualization", "Tableau", "Power BI",
            ],
        ),
        SkillCategory::new(
            "devops",
            "DevOps & Cloud",
            &[
                "AWS", "Azure", "Google Cloud", "Docker", "Kubernetes", "CI/CD", "Jenkins", "Git",
                "Linux", "Bash", "Terraform", "Ansible", "Prometheus", "Grafana", "ELK Stack",
            ],
        ),
        SkillCategory::new(
            "databases",
            "Databases",
            &[
                "SQL", "MySQL", "PostgreSQL", "MongoDB", "SQLite", "Oracle", "SQL Server",
                "Redis", "Elasticsearch", "DynamoDB", "Cassandra",
            ],
        ),
    ]
}
