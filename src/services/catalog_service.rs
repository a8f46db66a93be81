use crate::database::models::{CatalogItem, CatalogItemView, CATALOG_COLLECTION};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::state::AppState;

pub struct CatalogService {
    items: Repository<CatalogItem>,
}

impl CatalogService {
    pub fn new(state: &AppState) -> Self {
        Self {
            items: Repository::new(CATALOG_COLLECTION, state.db.clone()),
        }
    }

    pub async fn get_catalog(&self) -> Result<Vec<CatalogItemView>, ApiError> {
        let items = self
            .items
            .find_all(&Filter::all())
            .await
            .ok_or_else(|| ApiError::internal_server_error("Failed to get catalog"))?;
        Ok(items.into_iter().filter_map(CatalogItem::into_view).collect())
    }

    /// Insert new items, refusing the whole batch if any name is already taken.
    /// Returns the new item ids.
    pub async fn create_items(&self, items: Vec<CatalogItem>) -> Result<Vec<String>, ApiError> {
        let names = items.iter().map(|item| item.item_name.clone());
        let existing = self
            .items
            .find_all(&Filter::all().is_in("item_name", names))
            .await
            .unwrap_or_default();

        if !existing.is_empty() {
            let taken: Vec<&str> = existing.iter().map(|item| item.item_name.as_str()).collect();
            return Err(ApiError::bad_request(format!(
                "Failed to insert items: {:?} already exists",
                taken
            )));
        }

        Ok(self.items.insert_many(&items).await.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::DatabaseManager;

    fn item(name: &str, price: i64) -> CatalogItem {
        CatalogItem {
            id: None,
            item_name: name.to_string(),
            description: None,
            price,
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let state = AppState::new(AppConfig::development(), DatabaseManager::in_memory()).unwrap();
        let service = CatalogService::new(&state);

        assert!(service.get_catalog().await.unwrap().is_empty());

        let ids = service.create_items(vec![item("guitar", 300), item("drum", 80)]).await.unwrap();
        assert_eq!(ids.len(), 2);

        let catalog = service.get_catalog().await.unwrap();
        assert_eq!(catalog[0].item_id, ids[0]);
        assert_eq!(catalog[1].item_name, "drum");
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let state = AppState::new(AppConfig::development(), DatabaseManager::in_memory()).unwrap();
        let service = CatalogService::new(&state);
        service.create_items(vec![item("guitar", 300)]).await.unwrap();

        let err = service
            .create_items(vec![item("drum", 80), item("guitar", 250)])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::bad_request(r#"Failed to insert items: ["guitar"] already exists"#)
        );
        assert_eq!(service.get_catalog().await.unwrap().len(), 1);
    }
}
