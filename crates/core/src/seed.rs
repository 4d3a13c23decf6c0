//! Starter catalog written by `readrise seed`.

use crate::model::{
    Catalog, CatalogError, Difficulty, Level, LevelId, Question, QuestionId, Reading, ReadingId,
};

struct SeedReading {
    id: u64,
    title: &'static str,
    content: &'static str,
    difficulty: Difficulty,
    questions: [(&'static str, u32); 2],
}

struct SeedLevel {
    id: u64,
    title: &'static str,
    readings: &'static [SeedReading],
}

const LEVELS: &[SeedLevel] = &[
    SeedLevel {
        id: 1,
        title: "Beginner",
        readings: &[
            SeedReading {
                id: 1,
                title: "The Importance of Reading",
                content: "Reading is fundamental to functioning in today's society...",
                difficulty: Difficulty::Easy,
                questions: [
                    ("What is the main idea of this passage?", 10),
                    (
                        "Name two daily activities that become difficult for people who can't read well.",
                        15,
                    ),
                ],
            },
            SeedReading {
                id: 2,
                title: "The Benefits of Exercise",
                content: "Regular exercise is one of the most important things you can do for your health...",
                difficulty: Difficulty::Easy,
                questions: [
                    (
                        "What are three benefits of regular exercise mentioned in the passage?",
                        15,
                    ),
                    ("How can exercise impact your mental health?", 10),
                ],
            },
        ],
    },
    SeedLevel {
        id: 2,
        title: "Intermediate",
        readings: &[SeedReading {
            id: 3,
            title: "The Wonders of Space Exploration",
            content: "Space exploration has captivated human imagination for centuries...",
            difficulty: Difficulty::Medium,
            questions: [
                (
                    "What are two major milestones in space exploration mentioned in the passage?",
                    10,
                ),
                ("How has space exploration impacted our daily lives?", 15),
            ],
        }],
    },
    SeedLevel {
        id: 3,
        title: "Advanced",
        readings: &[SeedReading {
            id: 4,
            title: "The Importance of Biodiversity",
            content: "Biodiversity, the variety of life on Earth, is crucial for the health of our planet...",
            difficulty: Difficulty::Hard,
            questions: [
                ("What is biodiversity and what does it encompass?", 10),
                ("List three ecosystem services supported by biodiversity.", 15),
            ],
        }],
    },
    SeedLevel {
        id: 4,
        title: "Expert",
        readings: &[SeedReading {
            id: 5,
            title: "Quantum Computing: The Next Frontier",
            content: "Quantum computing is an emerging field that promises to revolutionize computation...",
            difficulty: Difficulty::Hard,
            questions: [
                ("What is a qubit and how does it differ from a classical bit?", 20),
                ("Name two potential applications of quantum computing.", 15),
            ],
        }],
    },
    SeedLevel {
        id: 5,
        title: "Master",
        readings: &[SeedReading {
            id: 6,
            title: "The Ethics of Artificial Intelligence",
            content: "As AI systems become more advanced and pervasive, ethical considerations are paramount...",
            difficulty: Difficulty::Hard,
            questions: [
                ("What are two main ethical concerns surrounding AI development?", 20),
                ("How might AI impact employment in the future?", 20),
            ],
        }],
    },
];

/// The five-level starter catalog, Beginner through Master.
///
/// # Errors
///
/// Returns `CatalogError` if the built-in content fails validation.
pub fn default_catalog() -> Result<Catalog, CatalogError> {
    let levels = LEVELS
        .iter()
        .map(|level| {
            let readings = level
                .readings
                .iter()
                .map(|r| {
                    let questions = r
                        .questions
                        .iter()
                        .zip(1_u64..)
                        .map(|((text, points), id)| Question::new(QuestionId::new(id), *text, *points))
                        .collect();
                    Reading::new(ReadingId::new(r.id), r.title, r.content, questions, r.difficulty)
                })
                .collect();
            Level::new(LevelId::new(level.id), level.title, readings, false)
        })
        .collect();
    Catalog::new(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_valid_and_ordered() {
        let catalog = default_catalog().unwrap();
        let titles: Vec<_> = catalog.levels().iter().map(Level::title).collect();
        assert_eq!(
            titles,
            vec!["Beginner", "Intermediate", "Advanced", "Expert", "Master"]
        );
        assert!(catalog.levels()[0].is_unlocked());
        assert!(catalog.levels()[1..].iter().all(|l| !l.is_unlocked()));
    }

    #[test]
    fn default_rewards() {
        let catalog = default_catalog().unwrap();
        let points: Vec<u32> = catalog
            .levels()
            .iter()
            .flat_map(|l| l.readings().iter().map(Reading::award_points))
            .collect();
        assert_eq!(points, vec![25, 25, 38, 50, 70, 80]);
    }
}
