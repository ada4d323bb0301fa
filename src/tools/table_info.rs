//! retrieving_table_information capability
//!
//! Returns the static description of the credit-card transaction table so
//! the reasoning engine understands the schema before composing a query.

use crate::error::Result;
use crate::tools::{ToolExecutor, ToolResult};
use serde_json::json;

/// Tool describing the transaction table schema
///
/// Input-less; the engine is instructed to call this before building SQL.
///
/// # Examples
///
/// ```
/// use fraudsight::tools::table_info::TableInfoTool;
/// use fraudsight::tools::ToolExecutor;
///
/// let tool = TableInfoTool::new("analytics.fraud_data".to_string());
/// # use serde_json::json;
/// # tokio_test::block_on(async {
/// let result = tool.execute(json!({})).await.unwrap();
/// assert!(result.output.contains("is_fraud"));
/// # });
/// ```
pub struct TableInfoTool {
    table: String,
}

impl TableInfoTool {
    /// Creates the tool for the given fully-qualified table name
    pub fn new(table: String) -> Self {
        Self { table }
    }

    fn description_text(&self) -> String {
        format!(
            r#"Table description: "{table}"

This table holds credit-card transaction records used for fraud detection.
Each row represents one unique transaction made by a card holder, covering
transaction details, card-holder personal information, and the geographic
locations involved.

### Columns

* **trans_date_trans_time** (TIMESTAMP)
  Full date and time the transaction occurred.
  Example: "2020-08-02 23:29:38.000000 UTC"

* **cc_num** (INTEGER)
  Unique credit-card number used for the transaction; the primary
  identifier of the card involved.
  Example: 6011399591920186

* **merchant** (STRING)
  Name of the merchant where the transaction took place. For searches use
  `ILIKE` with `%` patterns so matching is flexible and case-insensitive.
  Example: "%fraud_Donnelly LLC%", "%fraud_Dooley Inc%"

* **category** (STRING)
  Category of the transaction, classifying the nature of the spend.
  Example: "entertainment", "shopping_pos", "gas_transport"

* **amt** (FLOAT)
  Monetary amount of the transaction.
  Example: 19.44, 9.39, 60.71

* **first** (STRING)
  Card holder's first name.
  Example: "Maria"

* **last** (STRING)
  Card holder's last name.
  Example: "Roy"

* **gender** (STRING)
  Card holder's gender, 'M' for male or 'F' for female.
  Example: "F"

* **street** (STRING)
  Card holder's street address.
  Example: "58665 Nicholas Ford Suite 348"

* **city** (STRING)
  Card holder's city of residence.
  Example: "Sheffield"

* **state** (STRING)
  Abbreviated state of the card holder's address.
  Example: "MA"

* **zip** (INTEGER)
  Postal code of the card holder's address.
  Example: 1257

* **lat** (FLOAT)
  Latitude of the card holder's address.
  Example: 42.1001

* **long** (FLOAT)
  Longitude of the card holder's address.
  Example: -73.3611

* **city_pop** (INTEGER)
  Population of the card holder's city.
  Example: 2121

* **job** (STRING)
  Card holder's occupation. Use `ILIKE` with `%` patterns for flexible
  searches.
  Example: "%Radio producer%"

* **dob** (DATE)
  Card holder's date of birth, format YYYY-MM-DD.
  Example: "1973-10-14"

* **trans_num** (STRING)
  Unique identifier of each transaction.
  Example: "f40476d95acd240e32b37b4c4e34cf00"

* **unix_time** (INTEGER)
  Transaction time as a UNIX timestamp (seconds since 1970-01-01).
  Example: 1375486178

* **merch_lat** (FLOAT)
  Latitude of the merchant location.
  Example: 42.256509

* **merch_long** (FLOAT)
  Longitude of the merchant location.
  Example: -72.465971

* **is_fraud** (INTEGER)
  Binary flag marking whether the transaction is fraudulent: 1 means fraud,
  0 means legitimate.
  Example: 0, 1

### Relationships worth knowing

* Every `trans_num` is unique to one transaction row.
* One card holder (identified by `first` + `last`, or by `cc_num`) can have
  many transactions.
* `lat`/`long` locate the card holder while `merch_lat`/`merch_long` locate
  the merchant; the distance between the two can be a useful fraud signal."#,
            table = self.table
        )
    }
}

#[async_trait::async_trait]
impl ToolExecutor for TableInfoTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "retrieving_table_information",
            "description": "Retrieves the schema and detailed description of the credit-card transaction table. Call this first, before composing any SQL, to understand the table structure, column names, and data types.",
            "parameters": {
                "type": "object",
                "properties": {}
            }
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult> {
        Ok(ToolResult::success(self.description_text()))
    }
}
