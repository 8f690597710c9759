//! GraphQL query definitions for the catalog backend.
//!
//! Each query is a unit struct implementing [`GraphQLQuery`], with its
//! variables in a snake-case module of the same name, the same shape
//! `#[derive(GraphQLQuery)]` generates.

use core::fmt;
use core::str::FromStr;

use cornershop_core::{Category, Price, Product, ProductId};
use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Fields selected for every product.
macro_rules! product_fields {
    () => {
        "fragment ProductFields on product {
  EAN
  categoryId
  subcategoryId
  description
  id
  images
  inStock
  name
  price
  category {
    id
    name
  }
  subcategory {
    id
    name
  }
}
"
    };
}

macro_rules! graphql_query {
    ($name:ident, $variables:path, $data:ty, $document:expr) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $variables;
            type ResponseData = $data;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $document,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

/// Price ordering for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceOrder {
    Asc,
    Desc,
}

impl fmt::Display for PriceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

impl FromStr for PriceOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown price order `{other}`, expected `asc` or `desc`")),
        }
    }
}

/// Response data of every product query.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsData {
    pub product: Vec<Product>,
}

/// Response data of the category query.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesData {
    pub category: Vec<Category>,
}

/// Variables of queries that take none.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NoVariables;

// =============================================================================
// Product listings
// =============================================================================

graphql_query!(
    GetProductsDefault,
    NoVariables,
    ProductsData,
    concat!(
        "query GetProductsDefault {
  product {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod get_products_sorted {
    use super::{PriceOrder, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub sort_by: PriceOrder,
    }
}

graphql_query!(
    GetProductsSorted,
    get_products_sorted::Variables,
    ProductsData,
    concat!(
        "query GetProductsSorted($sortBy: order_by!) {
  product(order_by: {price: $sortBy}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod get_products_by_category {
    use super::Serialize;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub category: String,
    }
}

graphql_query!(
    GetProductsByCategory,
    get_products_by_category::Variables,
    ProductsData,
    concat!(
        "query GetProductsByCategory($category: String!) {
  product(where: {category: {name: {_eq: $category}}}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod get_products {
    use super::{PriceOrder, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub category: String,
        pub sort_by: PriceOrder,
    }
}

graphql_query!(
    GetProducts,
    get_products::Variables,
    ProductsData,
    concat!(
        "query GetProducts($category: String!, $sortBy: order_by!) {
  product(where: {category: {name: {_eq: $category}}}, order_by: {price: $sortBy}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod get_suggested_products {
    use super::Serialize;

    #[derive(Debug, Clone, Copy, Serialize)]
    pub struct Variables {
        pub limit: i64,
    }
}

graphql_query!(
    GetSuggestedProducts,
    get_suggested_products::Variables,
    ProductsData,
    concat!(
        "query GetSuggestedProducts($limit: Int!) {
  product(limit: $limit) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

// =============================================================================
// Filters
// =============================================================================

pub mod get_products_by_price {
    use super::{Price, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub price_from: Price,
        pub price_to: Price,
    }
}

graphql_query!(
    GetProductsByPrice,
    get_products_by_price::Variables,
    ProductsData,
    concat!(
        "query GetProductsByPrice($priceFrom: numeric!, $priceTo: numeric!) {
  product(where: {price: {_gte: $priceFrom, _lte: $priceTo}}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod search_products {
    use super::Serialize;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub search_input: String,
    }

    impl Variables {
        /// Match `text` anywhere in the product name.
        #[must_use]
        pub fn containing(text: &str) -> Self {
            Self {
                search_input: format!("%{text}%"),
            }
        }
    }
}

graphql_query!(
    SearchProducts,
    search_products::Variables,
    ProductsData,
    concat!(
        "query SearchProducts($searchInput: String!) {
  product(where: {name: {_ilike: $searchInput}}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod get_product_by_id {
    use super::{ProductId, Serialize};

    #[derive(Debug, Clone, Copy, Serialize)]
    pub struct Variables {
        pub id: ProductId,
    }
}

graphql_query!(
    GetProductById,
    get_product_by_id::Variables,
    ProductsData,
    concat!(
        "query GetProductById($id: Int!) {
  product(where: {id: {_eq: $id}}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

pub mod get_filtered_products {
    use super::Serialize;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub filter: Vec<String>,
    }
}

graphql_query!(
    GetFilteredProducts,
    get_filtered_products::Variables,
    ProductsData,
    concat!(
        "query GetFilteredProducts($filter: [String!]!) {
  product(where: {subcategory: {name: {_in: $filter}}}) {
    ...ProductFields
  }
}
",
        product_fields!()
    )
);

// =============================================================================
// Categories
// =============================================================================

graphql_query!(
    GetProductCategories,
    NoVariables,
    CategoriesData,
    "query GetProductCategories {
  category {
    id
    name
    subcategories {
      name
      id
      categoryId
    }
  }
}
"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use graphql_client::Response;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_operation_names_match_documents() {
        let body = GetProductsByPrice::build_query(get_products_by_price::Variables {
            price_from: Price::from_cents(1000).unwrap(),
            price_to: Price::from_cents(5000).unwrap(),
        });
        assert_eq!(body.operation_name, "GetProductsByPrice");
        assert!(body.query.starts_with("query GetProductsByPrice("));
        assert!(body.query.contains("fragment ProductFields on product"));

        let body = GetProductCategories::build_query(NoVariables);
        assert_eq!(body.operation_name, "GetProductCategories");
        assert!(!body.query.contains("ProductFields"));
    }

    #[test]
    fn test_variables_use_graphql_names() {
        let body = GetProducts::build_query(get_products::Variables {
            category: "Electronics".to_string(),
            sort_by: PriceOrder::Desc,
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["variables"],
            json!({"category": "Electronics", "sortBy": "desc"})
        );
        assert_eq!(value["operationName"], "GetProducts");

        let body = GetProductsByPrice::build_query(get_products_by_price::Variables {
            price_from: Price::from_cents(1000).unwrap(),
            price_to: Price::from_cents(29999).unwrap(),
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["variables"], json!({"priceFrom": 10.0, "priceTo": 299.99}));
    }

    #[test]
    fn test_search_wraps_text_in_wildcards() {
        let vars = search_products::Variables::containing("phone");
        assert_eq!(vars.search_input, "%phone%");
    }

    #[test]
    fn test_price_order_parsing() {
        assert_eq!("ASC".parse::<PriceOrder>().unwrap(), PriceOrder::Asc);
        assert_eq!("desc".parse::<PriceOrder>().unwrap(), PriceOrder::Desc);
        assert!("sideways".parse::<PriceOrder>().is_err());
        assert_eq!(PriceOrder::Desc.to_string(), "desc");
    }

    #[test]
    fn test_products_response_parses() {
        let raw = json!({
            "data": {
                "product": [{
                    "id": 4,
                    "name": "Designer Jeans",
                    "description": "Premium denim jeans",
                    "categoryId": 2,
                    "subcategoryId": 4,
                    "category": {"id": 2, "name": "Clothing"},
                    "subcategory": {"id": 4, "name": "Jeans"},
                    "price": 79.99,
                    "EAN": 1_234_567_890_126_u64,
                    "inStock": 75,
                    "images": ["jeans.jpg"]
                }]
            }
        });
        let response: Response<ProductsData> = serde_json::from_value(raw).unwrap();
        let data = response.data.unwrap();
        let jeans = data.product.first().unwrap();
        assert_eq!(jeans.id, ProductId::new(4));
        assert_eq!(jeans.price, Price::from_cents(7999).unwrap());
        assert_eq!(jeans.category.name, "Clothing");
    }

    #[test]
    fn test_categories_response_parses() {
        let raw = json!({
            "data": {
                "category": [{
                    "id": 3,
                    "name": "Home & Garden",
                    "subcategories": [
                        {"id": 5, "name": "Furniture", "categoryId": 3},
                        {"id": 6, "name": "Tools", "categoryId": 3}
                    ]
                }]
            }
        });
        let response: Response<CategoriesData> = serde_json::from_value(raw).unwrap();
        let categories = response.data.unwrap().category;
        assert_eq!(categories.first().unwrap().subcategories.len(), 2);
    }
}
