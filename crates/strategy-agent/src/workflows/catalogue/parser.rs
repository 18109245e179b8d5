use super::domain::{
    CatalogueItem, CatalogueItemId, Customer, CustomerId, Product, ProductId, SalesRecord, Store,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub fn read_customers<R: Read>(reader: R) -> Result<Vec<Customer>, csv::Error> {
    read_rows::<CustomerRow, _>(reader).map(|rows| rows.into_iter().map(Into::into).collect())
}

pub fn read_catalogue<R: Read>(reader: R) -> Result<Vec<CatalogueItem>, csv::Error> {
    read_rows::<CatalogueRow, _>(reader).map(|rows| rows.into_iter().map(Into::into).collect())
}

pub fn read_products<R: Read>(reader: R) -> Result<Vec<Product>, csv::Error> {
    read_rows::<ProductRow, _>(reader).map(|rows| rows.into_iter().map(Into::into).collect())
}

pub fn read_sales<R: Read>(reader: R) -> Result<Vec<SalesRecord>, csv::Error> {
    read_rows::<SalesRow, _>(reader).map(|rows| rows.into_iter().map(Into::into).collect())
}

pub fn read_stores<R: Read>(reader: R) -> Result<Vec<Store>, csv::Error> {
    read_rows::<StoreRow, _>(reader).map(|rows| rows.into_iter().map(Into::into).collect())
}

fn read_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<T>().collect()
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(rename = "CustomerID")]
    id: String,
    #[serde(rename = "CustomerName")]
    name: String,
    #[serde(
        rename = "CustomerType",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    customer_type: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    #[serde(rename = "Region", default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(rename = "TotalStores", default)]
    total_stores: Option<u32>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: CustomerId::normalized(&row.id),
            name: row.name,
            customer_type: row.customer_type,
            country: row.country,
            region: row.region,
            total_stores: row.total_stores,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogueRow {
    #[serde(rename = "CustomerCatalogueItemID")]
    id: String,
    #[serde(rename = "CustomerID")]
    customer_id: String,
    #[serde(rename = "ProductName")]
    product_name: String,
    #[serde(
        rename = "Product Category",
        alias = "Category",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    category: Option<String>,
    #[serde(
        rename = "Description",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    description: Option<String>,
    #[serde(
        rename = "Ingredients",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    ingredients: Option<String>,
    #[serde(
        rename = "LinkedProductID",
        alias = "ProductID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    linked_item_id: Option<String>,
    #[serde(rename = "QuantityRequired", default)]
    quantity_required: Option<u64>,
}

impl From<CatalogueRow> for CatalogueItem {
    fn from(row: CatalogueRow) -> Self {
        let ingredients = row
            .ingredients
            .as_deref()
            .map(split_ingredient_groups)
            .unwrap_or_default();

        Self {
            id: CatalogueItemId(row.id),
            customer_id: CustomerId::normalized(&row.customer_id),
            product_name: row.product_name,
            category: row.category,
            description: row.description,
            ingredients,
            linked_item_id: row.linked_item_id.map(ProductId),
            quantity_required: row.quantity_required.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(rename = "ProductID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Category", default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(
        rename = "Subcategory",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    subcategory: Option<String>,
    #[serde(
        rename = "Description",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    description: Option<String>,
    #[serde(rename = "Price", default)]
    price: Option<f64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId(row.id),
            name: row.name,
            category: row.category,
            subcategory: row.subcategory,
            description: row.description,
            price: row.price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SalesRow {
    #[serde(rename = "CustomerID")]
    customer_id: String,
    #[serde(
        rename = "CustomerCatalogueItemID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    catalogue_item_id: Option<String>,
    #[serde(rename = "ProductID")]
    item_id: String,
    #[serde(rename = "Quantity", alias = "QuantitySold", default)]
    quantity_sold: Option<u64>,
    #[serde(rename = "StoreID", default, deserialize_with = "empty_string_as_none")]
    store_id: Option<String>,
}

impl From<SalesRow> for SalesRecord {
    fn from(row: SalesRow) -> Self {
        Self {
            customer_id: CustomerId::normalized(&row.customer_id),
            catalogue_item_id: row.catalogue_item_id.map(CatalogueItemId),
            item_id: ProductId(row.item_id),
            quantity_sold: row.quantity_sold.unwrap_or(0),
            store_id: row.store_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoreRow {
    #[serde(rename = "StoreID")]
    id: String,
    #[serde(rename = "CustomerID")]
    customer_id: String,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            customer_id: CustomerId::normalized(&row.customer_id),
        }
    }
}

pub(crate) fn split_ingredient_groups(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
