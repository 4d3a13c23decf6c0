use readrise_core::model::{
    CatalogEdit, Difficulty, Level, LevelId, Question, QuestionId, QuestionPatch, Reading,
    ReadingId, ReadingPatch, UserId,
};
use readrise_core::{PlayState, ProgressionError};
use readrise_core::time::fixed_clock;
use services::{AppServices, PlayError};
use storage::repository::Storage;

fn reading(id: u64, points: [u32; 2], difficulty: Difficulty) -> Reading {
    Reading::new(
        ReadingId::new(id),
        format!("Reading {id}"),
        "Some text to read.",
        vec![
            Question::new(QuestionId::new(1), "First?", points[0]),
            Question::new(QuestionId::new(2), "Second?", points[1]),
        ],
        difficulty,
    )
}

fn two_level_catalog() -> Vec<Level> {
    vec![
        Level::new(
            LevelId::new(1),
            "Level 1",
            vec![
                reading(1, [10, 15], Difficulty::Easy),
                reading(2, [10, 15], Difficulty::Easy),
            ],
            true,
        ),
        Level::new(
            LevelId::new(2),
            "Level 2",
            vec![reading(1, [20, 15], Difficulty::Hard)],
            false,
        ),
    ]
}

async fn services(db: &str) -> AppServices {
    let storage = Storage::sqlite(&format!("sqlite:file:memdb_{db}?mode=memory&cache=shared"))
        .await
        .expect("connect sqlite");
    let services = AppServices::from_storage(fixed_clock(), &storage);
    services
        .content()
        .replace_levels(two_level_catalog())
        .await
        .expect("store catalog");
    services
}

async fn complete(services: &AppServices, user: &UserId, level: u64, reading: u64) -> u32 {
    let play = services.play();
    let state = play.view(user).await.unwrap().state;
    if state == PlayState::BrowsingLevels {
        play.select_level(user, LevelId::new(level)).await.unwrap();
    }
    play.select_reading(user, ReadingId::new(reading))
        .await
        .unwrap();
    for q in [1, 2] {
        play.record_answer(user, QuestionId::new(q), format!("answer {q}"))
            .await
            .unwrap();
    }
    play.submit(user).await.unwrap().earned_points
}

#[tokio::test]
async fn completing_level_one_unlocks_level_two() {
    let services = services("unlock_flow").await;
    let user = UserId::new("player-1").unwrap();
    let play = services.play();

    assert!(matches!(
        play.select_level(&user, LevelId::new(2)).await.unwrap_err(),
        PlayError::Progression(ProgressionError::LevelLocked(_))
    ));

    assert_eq!(complete(&services, &user, 1, 1).await, 25);
    let view = play.view(&user).await.unwrap();
    assert_eq!(
        view.state,
        PlayState::BrowsingReadings {
            level_id: LevelId::new(1)
        }
    );
    assert!(!view.levels[1].unlocked);

    assert_eq!(complete(&services, &user, 1, 2).await, 25);
    let view = play.back(&user).await.unwrap();
    assert_eq!(view.state, PlayState::BrowsingLevels);
    assert!(view.levels[1].unlocked);
    assert_eq!(view.stats.xp, 50);
    assert_eq!(view.stats.level, 1);
    assert_eq!(view.stats.streak, 2);

    assert_eq!(complete(&services, &user, 2, 1).await, 70);
    let profile = play.profile(&user).await.unwrap();
    assert_eq!(profile.stats.total_points, 120);
    assert_eq!(profile.stats.level, 2);
    assert_eq!(profile.stats.xp_into_level, 20);
}

#[tokio::test]
async fn blank_answer_blocks_submission_without_changes() {
    let services = services("blank_answer").await;
    let user = UserId::new("player-2").unwrap();
    let play = services.play();

    play.select_level(&user, LevelId::new(1)).await.unwrap();
    play.select_reading(&user, ReadingId::new(1)).await.unwrap();
    play.record_answer(&user, QuestionId::new(1), "filled".into())
        .await
        .unwrap();
    play.record_answer(&user, QuestionId::new(2), "   ".into())
        .await
        .unwrap();

    let err = play.submit(&user).await.unwrap_err();
    match err {
        PlayError::Progression(ProgressionError::IncompleteAnswers { unanswered }) => {
            assert_eq!(unanswered, vec![QuestionId::new(2)]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let view = play.view(&user).await.unwrap();
    assert_eq!(view.stats.xp, 0);
    let reading = view.reading.expect("still answering");
    assert!(!reading.is_completed());
    assert_eq!(reading.questions()[0].answer(), "filled");
}

#[tokio::test]
async fn completed_reading_cannot_be_resubmitted() {
    let services = services("resubmit").await;
    let user = UserId::new("player-3").unwrap();
    let play = services.play();

    complete(&services, &user, 1, 1).await;
    play.select_reading(&user, ReadingId::new(1)).await.unwrap();
    let err = play.submit(&user).await.unwrap_err();
    assert!(matches!(
        err,
        PlayError::Progression(ProgressionError::AlreadyCompleted(_))
    ));
    assert_eq!(play.profile(&user).await.unwrap().stats.total_points, 25);
}

#[tokio::test]
async fn concurrent_submissions_award_once() {
    let services = services("concurrent").await;
    let user = UserId::new("player-4").unwrap();
    let play = services.play();

    play.select_level(&user, LevelId::new(1)).await.unwrap();
    play.select_reading(&user, ReadingId::new(1)).await.unwrap();
    for q in [1, 2] {
        play.record_answer(&user, QuestionId::new(q), "yes".into())
            .await
            .unwrap();
    }

    let (a, b) = tokio::join!(play.submit(&user), play.submit(&user));
    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    assert_eq!(play.profile(&user).await.unwrap().stats.total_points, 25);
}

#[tokio::test]
async fn players_do_not_share_progress() {
    let services = services("isolation").await;
    let first = UserId::new("first").unwrap();
    let second = UserId::new("second").unwrap();

    complete(&services, &first, 1, 1).await;
    let levels = services.play().levels(&second).await.unwrap();
    assert!(!levels[0].readings()[0].is_completed());

    let top = services.leaderboard().top(10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].user_id, first);
}

#[tokio::test]
async fn admin_edits_keep_player_progress() {
    let services = services("edits").await;
    let user = UserId::new("player-5").unwrap();
    complete(&services, &user, 1, 1).await;

    let levels = services
        .content()
        .edit(vec![CatalogEdit::UpdateReading {
            level_id: LevelId::new(1),
            reading_id: ReadingId::new(2),
            patch: ReadingPatch {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        }])
        .await
        .unwrap();
    assert_eq!(levels[0].readings()[1].title(), "Renamed");

    let joined = services.play().levels(&user).await.unwrap();
    assert!(joined[0].readings()[0].is_completed());
    assert_eq!(joined[0].readings()[1].title(), "Renamed");
}

#[tokio::test]
async fn level_added_after_finishing_the_catalog_is_open() {
    let services = services("appended_level").await;
    let single = vec![two_level_catalog().remove(0)];
    services.content().replace_levels(single).await.unwrap();

    let user = UserId::new("player-6").unwrap();
    complete(&services, &user, 1, 1).await;
    complete(&services, &user, 1, 2).await;

    let level_2 = LevelId::new(2);
    let reading_1 = ReadingId::new(1);
    services
        .content()
        .edit(vec![
            CatalogEdit::AddLevel,
            CatalogEdit::AddReading { level_id: level_2 },
            CatalogEdit::AddQuestion {
                level_id: level_2,
                reading_id: reading_1,
            },
            CatalogEdit::UpdateQuestion {
                level_id: level_2,
                reading_id: reading_1,
                question_id: QuestionId::new(1),
                patch: QuestionPatch {
                    text: Some("What happened?".into()),
                    ..Default::default()
                },
            },
        ])
        .await
        .unwrap();

    let play = services.play();
    let joined = play.levels(&user).await.unwrap();
    assert!(joined[0].all_completed());
    assert!(joined[1].is_unlocked());

    play.back_to_levels(&user).await.unwrap();
    let view = play.select_level(&user, level_2).await.unwrap();
    assert_eq!(view.state, PlayState::BrowsingReadings { level_id: level_2 });

    let newcomer = UserId::new("player-7").unwrap();
    let err = play.select_level(&newcomer, level_2).await.unwrap_err();
    assert!(matches!(
        err,
        PlayError::Progression(ProgressionError::LevelLocked(_))
    ));
}
