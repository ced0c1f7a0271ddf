use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use recipe_link::controller::SubmitError;
use recipe_link::model::DraftError;
use recipe_link::{
    Category, Country, ExtractionController, NotificationKind, RecipeLinkError, RecipeRecord,
    RecipeStore, RelaySender, RestRecipeStore, Result, WebhookEnvelope,
};

struct NoRelay;

#[async_trait]
impl RelaySender for NoRelay {
    async fn send(&self, _video_url: &str) -> Result<WebhookEnvelope> {
        panic!("submission must not call the relay");
    }
}

#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<RecipeRecord>>,
    fail: bool,
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert(&self, record: &RecipeRecord) -> Result<()> {
        if self.fail {
            return Err(RecipeLinkError::StoreError {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn controller() -> (
    ExtractionController,
    tokio::sync::mpsc::UnboundedReceiver<recipe_link::Notification>,
) {
    ExtractionController::new(Arc::new(NoRelay), Duration::from_millis(1000))
}

fn fill(controller: &ExtractionController) {
    controller.set_title("Kimchi Fried Rice");
    controller.set_category(Some(Category::Simple));
    controller.set_country(Some(Country::Korean));
    controller.update_ingredient(0, "rice");
    controller.add_ingredient();
    controller.update_ingredient(1, "  ");
    controller.update_step(0, "fry everything");
}

#[tokio::test]
async fn test_submit_persists_non_blank_rows() {
    let (mut controller, mut notifications) = controller();
    let store = MemoryStore::default();
    fill(&controller);

    let record = controller.submit(&store, Some("user-1")).await.unwrap();

    assert_eq!(record.ingredients, vec!["rice".to_string()]);
    assert_eq!(record.video_url, None);
    assert_eq!(store.rows.lock().unwrap().len(), 1);
    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.description, "Recipe added successfully");
    assert_eq!(controller.draft(), recipe_link::RecipeDraft::default());
}

#[tokio::test]
async fn test_missing_fields_block_persistence() {
    let (mut controller, mut notifications) = controller();
    let store = MemoryStore::default();
    fill(&controller);
    controller.set_title("   ");

    let result = controller.submit(&store, Some("user-1")).await;

    assert!(matches!(
        result,
        Err(SubmitError::Invalid(DraftError::MissingFields))
    ));
    assert!(store.rows.lock().unwrap().is_empty());
    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.title, "Missing Information");
    assert_eq!(controller.draft().ingredients[0], "rice");
}

#[tokio::test]
async fn test_blank_rows_block_persistence() {
    let (mut controller, mut notifications) = controller();
    let store = MemoryStore::default();
    fill(&controller);
    controller.update_step(0, "");

    let result = controller.submit(&store, Some("user-1")).await;

    assert!(matches!(
        result,
        Err(SubmitError::Invalid(DraftError::MissingRows))
    ));
    assert!(store.rows.lock().unwrap().is_empty());
    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.title, "Missing Information");
    assert_eq!(
        notification.description,
        "Please add at least one ingredient and one step"
    );
}

#[tokio::test]
async fn test_missing_category_blocks_persistence() {
    let (mut controller, _notifications) = controller();
    let store = MemoryStore::default();
    fill(&controller);
    controller.set_category(None);

    let result = controller.submit(&store, Some("user-1")).await;

    assert!(matches!(
        result,
        Err(SubmitError::Invalid(DraftError::MissingFields))
    ));
    assert!(store.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_signed_out_user_cannot_submit() {
    let (mut controller, mut notifications) = controller();
    let store = MemoryStore::default();
    fill(&controller);

    let result = controller.submit(&store, None).await;

    assert!(matches!(result, Err(SubmitError::Unauthenticated)));
    assert!(store.rows.lock().unwrap().is_empty());
    assert_eq!(
        notifications.recv().await.unwrap().title,
        "Authentication Required"
    );
}

#[tokio::test]
async fn test_store_failure_keeps_the_draft() {
    let (mut controller, mut notifications) = controller();
    let store = MemoryStore {
        fail: true,
        ..MemoryStore::default()
    };
    fill(&controller);
    let before = controller.draft();

    let result = controller.submit(&store, Some("user-1")).await;

    assert!(matches!(result, Err(SubmitError::Store(_))));
    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.description, "Failed to add recipe");
    assert_eq!(controller.draft(), before);
}

#[tokio::test]
async fn test_submit_to_rest_store() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/recipes")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "title": "Kimchi Fried Rice",
            "ingredients": ["rice"],
            "category": "simple",
            "country": "Korean",
            "created_by": "user-1"
        })))
        .with_status(201)
        .create_async()
        .await;

    let config = recipe_link::config::StoreConfig {
        base_url: Some(server.url()),
        api_key: Some("anon".to_string()),
        ..Default::default()
    };
    let store = RestRecipeStore::new(&config).unwrap();
    let (mut controller, _notifications) = controller();
    fill(&controller);

    controller.submit(&store, Some("user-1")).await.unwrap();
    mock.assert_async().await;
}
