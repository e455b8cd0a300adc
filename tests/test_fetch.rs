use mockito::Server;
use recipe_cleaner::api::handle_request;
use recipe_cleaner::{fetch_recipe, RecipeError, Settings};

const RECIPE_PAGE: &str = r#"<html><head>
<script type="application/ld+json">
{
  "@context": "https://schema.org",
  "@graph": [
    {"@type": "WebSite", "name": "Bread Blog"},
    {
      "@type": ["Recipe", "NewsArticle"],
      "name": "No-Knead Bread",
      "recipeYield": 1,
      "recipeIngredient": ["3 cups flour", "1 1/2 cups warm water", "1 tsp yeast", "2 tsp salt"],
      "recipeInstructions": [
        {"@type": "HowToStep", "text": "Mix everything in a bowl."},
        {"@type": "HowToStep", "text": "Rest overnight."},
        {"@type": "HowToStep", "text": "Bake in a hot dutch oven."}
      ]
    }
  ]
}
</script></head><body><h1>Ignored</h1></body></html>"#;

#[tokio::test]
async fn test_fetch_recipe_from_json_ld() {
    let _ = env_logger::try_init();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/bread")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(RECIPE_PAGE)
        .create_async()
        .await;

    let url = format!("{}/bread", server.url());
    let recipe = fetch_recipe(&url).await.unwrap();

    assert_eq!(recipe.title, "No-Knead Bread");
    assert_eq!(recipe.servings, "1");
    assert_eq!(recipe.ingredients.len(), 4);
    assert_eq!(recipe.steps[0], "Mix everything in a bowl.");
    assert_eq!(recipe.steps.len(), 3);
    assert_eq!(recipe.source_url.as_deref(), Some(url.as_str()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_recipe_upstream_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;

    let result = fetch_recipe(&format!("{}/gone", server.url())).await;
    assert!(matches!(result, Err(RecipeError::UpstreamStatus(404))));
}

#[tokio::test]
async fn test_fetch_recipe_rejects_non_http_url() {
    let result = fetch_recipe("file:///etc/passwd").await;
    assert!(matches!(result, Err(RecipeError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_handle_request_success() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/bread")
        .with_status(200)
        .with_body(RECIPE_PAGE)
        .create_async()
        .await;

    let url = format!("{}/bread", server.url());
    let response = handle_request("GET", Some(&url), &Settings::default()).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    let body = response.body.unwrap();
    assert_eq!(body["sourceUrl"], url.as_str());
    assert_eq!(body["title"], "No-Knead Bread");
    assert_eq!(body["ingredients"][0], "3 cups flour");
    assert_eq!(body["steps"].as_array().unwrap().len(), 3);
    assert!(body.get("servings").is_none());
}

#[tokio::test]
async fn test_handle_request_hides_upstream_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/broken")
        .with_status(500)
        .with_body("stack trace the client must not see")
        .create_async()
        .await;

    let url = format!("{}/broken", server.url());
    let response = handle_request("GET", Some(&url), &Settings::default()).await;

    assert_eq!(response.status, 500);
    assert_eq!(
        response.body,
        Some(serde_json::json!({"error": "Failed to parse this page."}))
    );
}
