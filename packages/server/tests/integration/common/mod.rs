use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use catalog_server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig};
use catalog_server::state::AppState;
use ::common::ImageStore;
use ::common::storage::filesystem::FilesystemImageStore;

pub mod routes {
    pub const PRODUCTS: &str = "/api/v1/products";
    pub const CHECKOUT: &str = "/api/v1/products/checkout";
    pub const COMMENTS: &str = "/api/v1/comments";

    pub fn product(id: i32) -> String {
        format!("/api/v1/products/{id}")
    }

    pub fn product_comments(id: i32) -> String {
        format!("/api/v1/products/{id}/comments")
    }

    pub fn products_page(page: i64, size: i64, sort_by: &str) -> String {
        format!("/api/v1/products?pageNumber={page}&pageSize={size}&sortBy={sort_by}")
    }

    pub fn comment(id: i32) -> String {
        format!("/api/v1/comments/{id}")
    }
}

/// Scalar fields of a product form.
#[derive(Clone)]
pub struct ProductInput {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub count: i32,
}

impl ProductInput {
    pub fn new(name: &str, count: i32) -> Self {
        Self {
            name: name.to_string(),
            width: 1.0,
            height: 2.0,
            weight: 0.5,
            count,
        }
    }

    fn form(&self) -> Form {
        Form::new()
            .text("name", self.name.clone())
            .text("width", self.width.to_string())
            .text("height", self.height.to_string())
            .text("weight", self.weight.to_string())
            .text("count", self.count.to_string())
    }
}

/// A running test server backed by a throwaway SQLite file and web root.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub images: Arc<dyn ImageStore>,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// `Location` header, if any.
    pub location: Option<String>,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("catalog.db").display()
        );
        let web_root = dir.path().join("wwwroot");

        let db = catalog_server::database::init_db(&db_url, 5)
            .await
            .expect("Failed to initialize test database");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url.clone(),
                max_connections: 5,
            },
            storage: StorageConfig {
                web_root: web_root.clone(),
                max_image_size: 1024 * 1024,
            },
        };

        let images: Arc<dyn ImageStore> = Arc::new(
            FilesystemImageStore::new(web_root, app_config.storage.max_image_size)
                .await
                .expect("Failed to create image store"),
        );

        let state = AppState {
            db: db.clone(),
            images: images.clone(),
            config: app_config,
        };

        let app = catalog_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            images,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_bytes(&self, path: &str) -> (u16, Vec<u8>) {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        let status = res.status().as_u16();
        let bytes = res.bytes().await.unwrap_or_default().to_vec();
        (status, bytes)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// POST a product form, attaching `image` as `(file_name, bytes)` when given.
    pub async fn post_product(
        &self,
        input: &ProductInput,
        image: Option<(&str, Vec<u8>)>,
    ) -> TestResponse {
        let form = with_image(input.form(), image);
        let res = self
            .client
            .post(self.url(routes::PRODUCTS))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart POST request");

        TestResponse::from_response(res).await
    }

    /// PUT a product form, attaching `image` as `(file_name, bytes)` when given.
    pub async fn put_product(
        &self,
        id: i32,
        input: &ProductInput,
        image: Option<(&str, Vec<u8>)>,
    ) -> TestResponse {
        let form = with_image(input.form(), image);
        let res = self
            .client
            .put(self.url(&routes::product(id)))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart PUT request");

        TestResponse::from_response(res).await
    }

    /// Create a product with a small PNG payload and return its `id`.
    pub async fn create_product(&self, name: &str, count: i32) -> i32 {
        let res = self
            .post_product(
                &ProductInput::new(name, count),
                Some(("photo.png", b"PNG_DATA".to_vec())),
            )
            .await;
        assert_eq!(res.status, 201, "create_product failed: {}", res.text);
        res.id()
    }

    /// Add a comment via the API and return its `id`.
    pub async fn create_comment(&self, product_id: i32, description: &str) -> i32 {
        let res = self
            .post_json(
                routes::COMMENTS,
                &serde_json::json!({
                    "product_id": product_id,
                    "description": description,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "create_comment failed: {}", res.text);
        res.id()
    }

    pub async fn image_exists(&self, url: &str) -> bool {
        self.images
            .exists(url)
            .await
            .expect("image url should be valid")
    }
}

fn with_image(form: Form, image: Option<(&str, Vec<u8>)>) -> Form {
    match image {
        Some((file_name, bytes)) => form.part(
            "image",
            Part::bytes(bytes)
                .file_name(file_name.to_string())
                .mime_str("image/png")
                .expect("Failed to set MIME type"),
        ),
        None => form,
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let location = res
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            location,
            text,
            body,
        }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    pub fn image_url(&self) -> String {
        self.body["image_url"]
            .as_str()
            .expect("response body should contain 'image_url'")
            .to_string()
    }
}
