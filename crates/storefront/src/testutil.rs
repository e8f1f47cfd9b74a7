//! Shared unit-test fixtures.

use homegrid_core::CategoryId;
use homegrid_core::catalog::{CatalogParams, CatalogQuery};

use crate::models::{Compatibility, NewProduct};

/// A published, in-stock product fixture keyed by sku.
pub fn new_product(sku: &str, category_id: CategoryId) -> NewProduct {
    NewProduct {
        sku: sku.to_owned(),
        title: format!("Product {sku}"),
        brand: "Aqara".to_owned(),
        short_desc: "A compact zigbee sensor".to_owned(),
        long_desc: "A compact zigbee sensor with long battery life".to_owned(),
        price_cad: 2499,
        price_usd: 1999,
        stock: 10,
        images: vec![format!("/images/{sku}.jpg")],
        protocol: "zigbee".to_owned(),
        power: Some("battery".to_owned()),
        room_tags: vec!["bedroom".to_owned()],
        beginner_friendly: true,
        compat: Compatibility {
            google: true,
            alexa: true,
            ha: true,
            zigbee: true,
            ..Compatibility::default()
        },
        requires_bridge: vec![],
        published: true,
        category_id,
    }
}

/// Turn a [`NewProduct`] into a stored [`crate::models::Product`] with the
/// given id, the way an insert would.
pub fn materialize(id: i32, new: NewProduct) -> crate::models::Product {
    let now = chrono::Utc::now();
    crate::models::Product {
        id: homegrid_core::ProductId::new(id),
        sku: new.sku,
        title: new.title,
        brand: new.brand,
        short_desc: new.short_desc,
        long_desc: new.long_desc,
        price_cad: new.price_cad,
        price_usd: new.price_usd,
        stock: new.stock,
        images: new.images,
        protocol: new.protocol,
        power: new.power,
        room_tags: new.room_tags,
        beginner_friendly: new.beginner_friendly,
        compat: new.compat,
        requires_bridge: new.requires_bridge,
        published: new.published,
        category_id: new.category_id,
        created_at: now,
        updated_at: now,
    }
}

/// Build a normalized catalog query from raw key/value pairs.
pub fn catalog_query(pairs: &[(&str, &str)]) -> CatalogQuery {
    let mut params = CatalogParams::default();
    for (key, value) in pairs {
        let value = Some((*value).to_owned());
        match *key {
            "q" => params.q = value,
            "category" => params.category = value,
            "price_min" => params.price_min = value,
            "price_max" => params.price_max = value,
            "protocol" => params.protocol = value,
            "works" => params.works = value,
            "room" => params.room = value,
            "beginner" => params.beginner = value,
            "sort" => params.sort = value,
            "page" => params.page = value,
            "limit" => params.limit = value,
            other => panic!("unknown catalog param {other}"),
        }
    }
    CatalogQuery::from_params(params)
}
