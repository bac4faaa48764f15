use uuid::Uuid;

use datn_auth::error::AuthServiceError;
use datn_auth::usecase::rating::{
    CreateRatingInput, CreateRatingUseCase, ListRatingsUseCase, RespondRatingUseCase,
};
use datn_testing::auth::MockSession;

use crate::helpers::MockRatingRepo;

fn rating_input(product_id: i64, stars: i64) -> CreateRatingInput {
    CreateRatingInput {
        product_id,
        content: "Great fit, fast delivery".to_owned(),
        number_stars: stars,
    }
}

#[tokio::test]
async fn should_stamp_creator_from_session() {
    let session = MockSession::user().claims;
    let repo = MockRatingRepo::empty();

    let rating = CreateRatingUseCase {
        ratings: repo.clone(),
    }
    .execute(&session, rating_input(42, 5))
    .await
    .unwrap();

    assert_eq!(rating.user_id, session.id);
    assert_eq!(rating.number_stars, 5);
    assert_eq!(rating.audit.created.by, session.email);
    assert!(rating.audit.updated.is_none());
    assert_eq!(repo.ratings.lock().unwrap()[0].audit, rating.audit);
}

#[tokio::test]
async fn should_reject_stars_outside_one_to_five() {
    let session = MockSession::user().claims;
    let usecase = CreateRatingUseCase {
        ratings: MockRatingRepo::empty(),
    };

    for stars in [0, 6, -1, 300] {
        let result = usecase.execute(&session, rating_input(42, stars)).await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidRating)),
            "stars {stars}: got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_list_only_the_requested_product() {
    let session = MockSession::user().claims;
    let repo = MockRatingRepo::empty();
    let create = CreateRatingUseCase {
        ratings: repo.clone(),
    };
    create.execute(&session, rating_input(1, 4)).await.unwrap();
    create.execute(&session, rating_input(1, 3)).await.unwrap();
    create.execute(&session, rating_input(2, 5)).await.unwrap();

    let listed = ListRatingsUseCase { ratings: repo }.execute(1).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.product_id == 1));
    assert!(listed[0].audit.created.at >= listed[1].audit.created.at);
}

#[tokio::test]
async fn should_stamp_updater_when_admin_responds() {
    let author = MockSession::user().claims;
    let admin = MockSession::admin().claims;
    let repo = MockRatingRepo::empty();
    let rating = CreateRatingUseCase {
        ratings: repo.clone(),
    }
    .execute(&author, rating_input(42, 2))
    .await
    .unwrap();

    let updated = RespondRatingUseCase {
        ratings: repo.clone(),
    }
    .execute(&admin, rating.id, "Sorry, we will make it right")
    .await
    .unwrap();

    assert_eq!(
        updated.admin_response.as_deref(),
        Some("Sorry, we will make it right")
    );
    assert_eq!(updated.audit.created, rating.audit.created);
    let stamp = updated.audit.updated.clone().expect("update stamp");
    assert_eq!(stamp.by, admin.email);
    assert!(stamp.at >= rating.audit.created.at);

    let stored = repo.ratings.lock().unwrap()[0].clone();
    assert_eq!(stored.audit, updated.audit);
}

#[tokio::test]
async fn should_forbid_non_admin_responses() {
    let author = MockSession::user().claims;
    let repo = MockRatingRepo::empty();
    let rating = CreateRatingUseCase {
        ratings: repo.clone(),
    }
    .execute(&author, rating_input(42, 2))
    .await
    .unwrap();

    let result = RespondRatingUseCase {
        ratings: repo.clone(),
    }
    .execute(&author, rating.id, "I answer myself")
    .await;

    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
    assert!(repo.ratings.lock().unwrap()[0].admin_response.is_none());
}

#[tokio::test]
async fn should_report_missing_rating() {
    let admin = MockSession::admin().claims;
    let result = RespondRatingUseCase {
        ratings: MockRatingRepo::empty(),
    }
    .execute(&admin, Uuid::new_v4(), "hello")
    .await;
    assert!(matches!(result, Err(AuthServiceError::RatingNotFound)));
}
