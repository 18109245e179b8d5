//! Data access layer: customer, catalogue, product, sales and store tables
//! loaded wholesale into memory and keyed by their stable identifiers.

pub mod domain;
pub mod parser;

pub use domain::{
    CatalogueItem, CatalogueItemId, Customer, CustomerId, Product, ProductId, PurchaseHistory,
    SalesRecord, Store,
};

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const CUSTOMER_FILE: &str = "customer.csv";
pub const CATALOGUE_FILE: &str = "customer_catalogue_enhanced.csv";
pub const PRODUCT_FILE: &str = "products.csv";
pub const SALES_FILE: &str = "sales_enhanced.csv";
pub const STORE_FILE: &str = "stores.csv";

#[derive(Debug)]
pub enum DataLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
}

impl std::fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataLoadError::Io { path, source } => {
                write!(f, "failed to open {}: {}", path.display(), source)
            }
            DataLoadError::Csv { path, source } => {
                write!(f, "invalid CSV data in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DataLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataLoadError::Io { source, .. } => Some(source),
            DataLoadError::Csv { source, .. } => Some(source),
        }
    }
}

/// In-memory snapshot of every table a recommendation run reads.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    customers: Vec<Customer>,
    catalogue: Vec<CatalogueItem>,
    products: Vec<Product>,
    sales: Vec<SalesRecord>,
    stores: Vec<Store>,
    customer_index: HashMap<CustomerId, usize>,
    product_index: HashMap<ProductId, usize>,
}

impl Dataset {
    pub fn new(
        customers: Vec<Customer>,
        catalogue: Vec<CatalogueItem>,
        products: Vec<Product>,
        sales: Vec<SalesRecord>,
        stores: Vec<Store>,
    ) -> Self {
        let mut customer_index = HashMap::new();
        for (position, customer) in customers.iter().enumerate() {
            customer_index.entry(customer.id.clone()).or_insert(position);
        }

        let mut product_index = HashMap::new();
        for (position, product) in products.iter().enumerate() {
            product_index.entry(product.id.clone()).or_insert(position);
        }

        Self {
            customers,
            catalogue,
            products,
            sales,
            stores,
            customer_index,
            product_index,
        }
    }

    /// Loads the five tables from `dir` using their conventional file names.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DataLoadError> {
        let dir = dir.as_ref();

        let customers = load_table(dir, CUSTOMER_FILE, parser::read_customers)?;
        let catalogue = load_table(dir, CATALOGUE_FILE, parser::read_catalogue)?;
        let products = load_table(dir, PRODUCT_FILE, parser::read_products)?;
        let sales = load_table(dir, SALES_FILE, parser::read_sales)?;
        let stores = load_table(dir, STORE_FILE, parser::read_stores)?;

        tracing::info!(
            dir = %dir.display(),
            customers = customers.len(),
            catalogue_items = catalogue.len(),
            products = products.len(),
            sales_rows = sales.len(),
            stores = stores.len(),
            "dataset loaded"
        );

        Ok(Self::new(customers, catalogue, products, sales, stores))
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, id: &CustomerId) -> Option<&Customer> {
        self.customer_index
            .get(id)
            .and_then(|position| self.customers.get(*position))
    }

    /// The customer's catalogue rows in table order.
    pub fn catalogue_for<'a>(
        &'a self,
        id: &'a CustomerId,
    ) -> impl Iterator<Item = &'a CatalogueItem> + 'a {
        self.catalogue
            .iter()
            .filter(move |item| &item.customer_id == id)
    }

    /// Products in table order; similarity ties resolve by this order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.product_index
            .get(id)
            .and_then(|position| self.products.get(*position))
    }

    pub fn sales_for<'a>(&'a self, id: &'a CustomerId) -> impl Iterator<Item = &'a SalesRecord> + 'a {
        self.sales
            .iter()
            .filter(move |record| &record.customer_id == id)
    }

    pub fn purchase_history(&self, id: &CustomerId) -> PurchaseHistory {
        PurchaseHistory::from_sales(self.sales_for(id))
    }

    /// Distinct stores registered to the customer.
    pub fn store_count(&self, id: &CustomerId) -> usize {
        self.stores
            .iter()
            .filter(|store| &store.customer_id == id)
            .map(|store| store.id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

fn load_table<T, F>(dir: &Path, file_name: &str, read: F) -> Result<Vec<T>, DataLoadError>
where
    F: FnOnce(File) -> Result<Vec<T>, csv::Error>,
{
    let path = dir.join(file_name);
    let file = File::open(&path).map_err(|source| DataLoadError::Io {
        path: path.clone(),
        source,
    })?;
    read(file).map_err(|source| DataLoadError::Csv { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tables(dir: &Path) {
        fs::write(
            dir.join(CUSTOMER_FILE),
            "CustomerID,CustomerName,CustomerType,Country,Region,TotalStores\nC001,Northwind Bakeries,Retail,UK,North,3\n",
        )
        .expect("write customers");
        fs::write(
            dir.join(CATALOGUE_FILE),
            "CustomerCatalogueItemID,CustomerID,ProductName,Product Category,Description,Ingredients,QuantityRequired,LinkedProductID\n\
CAT-1,C001,Chocolate Chip Cookie,Bakery,Cookie,Biscuit Dough,500,P-1\n\
CAT-9,C002,Other,Bakery,Other,Flour,10,\n",
        )
        .expect("write catalogue");
        fs::write(
            dir.join(PRODUCT_FILE),
            "ProductID,Name,Category,Subcategory,Description,Price\nP-1,Cookie Dough,Bakery,Dough,Frozen,2.0\n",
        )
        .expect("write products");
        fs::write(
            dir.join(SALES_FILE),
            "CustomerID,CustomerCatalogueItemID,ProductID,Quantity,StoreID\nC001,CAT-1,P-1,120,S1\nC001,CAT-1,P-1,30,S2\nC002,CAT-9,P-1,7,S9\n",
        )
        .expect("write sales");
        fs::write(
            dir.join(STORE_FILE),
            "StoreID,CustomerID\nS1,C001\nS2,C001\nS2,C001\nS9,C002\n",
        )
        .expect("write stores");
    }

    #[test]
    fn from_dir_indexes_tables_per_customer() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_tables(dir.path());

        let dataset = Dataset::from_dir(dir.path()).expect("dataset loads");
        let customer = CustomerId("C001".to_string());

        assert_eq!(
            dataset.customer(&customer).map(|c| c.name.as_str()),
            Some("Northwind Bakeries")
        );
        assert_eq!(dataset.catalogue_for(&customer).count(), 1);
        assert_eq!(dataset.store_count(&customer), 2);
        let history = dataset.purchase_history(&customer);
        assert_eq!(history.quantity_for(&ProductId("P-1".to_string())), 150);
        assert_eq!(history.total_quantity(), 150);
        assert!(dataset.product(&ProductId("P-1".to_string())).is_some());
    }

    #[test]
    fn from_dir_reports_missing_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = Dataset::from_dir(dir.path()).expect_err("expected io error");

        match error {
            DataLoadError::Io { path, .. } => assert!(path.ends_with(CUSTOMER_FILE)),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn from_dir_reports_csv_errors_with_table_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_tables(dir.path());
        fs::write(dir.path().join(SALES_FILE), "CustomerID,ProductID,Quantity\nC001,P-1,many\n")
            .expect("overwrite sales");

        match Dataset::from_dir(dir.path()) {
            Err(DataLoadError::Csv { path, .. }) => assert!(path.ends_with(SALES_FILE)),
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_customer_has_no_rows() {
        let dataset = Dataset::default();
        let customer = CustomerId("C404".to_string());
        assert!(dataset.customer(&customer).is_none());
        assert_eq!(dataset.catalogue_for(&customer).count(), 0);
        assert_eq!(dataset.store_count(&customer), 0);
    }
}
