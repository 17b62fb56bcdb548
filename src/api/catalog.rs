//! Auth, product and user endpoints.

use serde_json::json;

use super::{ApiClient, Query};
use crate::errors::ApiError;
use crate::model::{ListEnvelope, LoginResponse, NewUser, Product, ProductForm, ProductPage, Role, User};

/// Paging and filtering for the product admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub query: Option<String>,
    pub page: u32,
    pub take: u32,
    pub include_inactive: bool,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            query: None,
            page: 1,
            take: 20,
            include_inactive: false,
        }
    }
}

impl ProductQuery {
    fn pairs(&self) -> Query {
        let mut pairs: Query = Vec::new();
        if let Some(q) = self.query.as_ref().filter(|q| !q.trim().is_empty()) {
            pairs.push(("query", q.clone()));
        }
        pairs.push(("take", self.take.to_string()));
        pairs.push(("page", self.page.max(1).to_string()));
        if self.include_inactive {
            pairs.push(("includeInactive", "true".to_string()));
        }
        pairs
    }
}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.post("/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        self.get("/products", &query.pairs()).await
    }

    /// Product picker lookup: up to 50 matches, active products only.
    pub async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let mut query: Query = Vec::new();
        if !text.trim().is_empty() {
            query.push(("query", text.to_string()));
        }
        query.push(("take", "50".to_string()));
        let list: ListEnvelope<Product> = self.get("/products", &query).await?;
        Ok(list.into_items().into_iter().filter(|p| p.is_active).collect())
    }

    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, ApiError> {
        self.post("/products", form).await
    }

    pub async fn update_product(&self, id: &str, form: &ProductForm) -> Result<Product, ApiError> {
        self.patch(&format!("/products/{}", id), form).await
    }

    /// Soft delete: the service marks the product inactive.
    pub async fn deactivate_product(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/products/{}", id)).await.map(|_| ())
    }

    pub async fn restore_product(&self, id: &str) -> Result<Product, ApiError> {
        self.patch(&format!("/products/{}", id), &json!({ "isActive": true }))
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let list: ListEnvelope<User> = self.get("/users", &Vec::new()).await?;
        Ok(list.into_items())
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post("/users", user).await
    }

    pub async fn change_role(&self, id: &str, role: Role) -> Result<User, ApiError> {
        self.patch(&format!("/users/{}", id), &json!({ "role": role }))
            .await
    }

    pub async fn reset_password(&self, id: &str, password: &str) -> Result<(), ApiError> {
        self.patch::<_, serde_json::Value>(
            &format!("/users/{}/password", id),
            &json!({ "password": password }),
        )
        .await
        .map(|_| ())
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/users/{}", id)).await.map(|_| ())
    }
}
