//! retrieving_rag_info capability
//!
//! Returns the static summary of the two reference documents available for
//! semantic retrieval, so the engine can judge whether a conceptual question
//! is answerable from them.

use crate::error::Result;
use crate::tools::{ToolExecutor, ToolResult};
use serde_json::json;

const FILE_INFO: &str = r#"** There are 2 documents available for retrieval

TITLE: Understanding Credit Card Frauds
Authors: Tej Paul Bhatla, Vikram Prabhu & Amit Dua
This paper provides an overview of credit card fraud, detailing how it is
committed, its impact on various stakeholders, and the technologies used for
its prevention and management.
Key fraud statistics and methods:
- Credit card fraud is defined as an individual using another person's credit
  card for personal reasons without the owner's or issuer's knowledge and with
  no intent to repay.
- Merchants are at a significantly higher risk from credit card fraud than
  cardholders. The rate of internet fraud is 12 to 15 times higher than in the
  "physical world".
- The most common type of fraud is the use of a lost or stolen card,
  accounting for 48% of cases. Other methods include identity theft (15%),
  skimming (14%), and counterfeit cards (12%).
- Fraud techniques are broadly classified into three categories: card-related,
  merchant-related, and internet-related frauds.
  - Card-related: application fraud, account takeover, and counterfeit cards
    created through methods like skimming (electronically copying data from a
    card's magnetic stripe).
  - Merchant-related: merchant collusion, where owners or employees conspire
    to use customer information fraudulently.
  - Internet-related: site cloning (copying legitimate websites) and false
    merchant sites built to harvest card details.
Impact of fraud:
- Cardholders: generally the least impacted party, as consumer liability is
  often limited by law and bank policies.
- Merchants: the most affected party, especially in card-not-present
  transactions, as they must accept full liability for fraud losses. Costs
  include the value of the goods, shipping, chargeback fees from card
  associations, and damage to their reputation.
- Banks (issuers/acquirers): incur administrative costs related to
  chargebacks and must invest in sophisticated IT systems to prevent and
  detect fraud.
Fraud prevention and management:
- Technologies include Address Verification Systems (AVS), Card Verification
  Methods (CVM), and negative/positive lists of customers or card numbers.
- Recent developments include rule-based systems, risk-scoring technologies,
  neural networks, biometrics, and smart cards with embedded chips (EMV).
- Effective fraud management minimizes the "total cost of fraud": both the
  financial losses and the operational cost of prevention, balancing
  insufficient screening against excessive reviews.

TITLE: 2024 Report on Payment Fraud
Authors: the European Banking Authority (EBA) and the European Central Bank
(ECB)
This report analyzes payment fraud data across the European Economic Area
(EEA) for H1 2022, H2 2022, and H1 2023, covering credit transfers, direct
debits, card payments, cash withdrawals, and e-money transactions.
Key findings:
- Overall fraud levels: total payment fraud across the EEA was EUR 4.3
  billion in 2022 and EUR 2.0 billion in the first half of 2023.
- Fraud by payment type: in value terms, credit transfers and card payments
  experienced the highest fraud levels; in H1 2023 fraudulent credit
  transfers amounted to EUR 1.131 billion and card fraud to EUR 633 million.
  In volume terms, card payments accounted for the most fraudulent
  transactions, 7.31 million in H1 2023.
- Primary fraud methods: for credit transfers, manipulation of the payer
  accounted for over half of the fraud value. Card fraud was predominantly
  committed through issuance of a payment order by a fraudster; remote card
  fraud was mainly caused by card details theft (64% by volume in H1 2023),
  non-remote fraud by lost or stolen cards (over 50% by volume in H1 2023).
- Strong Customer Authentication (SCA): applied to the majority of electronic
  payments, especially credit transfers (around 77% by value). Transactions
  with SCA consistently showed lower fraud rates. Card fraud rates are about
  ten times higher when the counterpart is outside the EEA, where SCA may not
  be required.
- Distribution of losses: payment service users bore over 80% of credit
  transfer fraud losses; card payment and cash withdrawal losses were more
  evenly split, with users bearing 45% and 51% respectively in H1 2023.
- Geographical dimension: most payment transactions were domestic, yet a
  majority of card payment fraud was cross-border (71% by value in H1 2023);
  28% of fraudulent card payments in H1 2023 involved counterparts outside
  the EEA."#;

/// Tool summarizing the reference documents available for retrieval
pub struct RagInfoTool;

impl RagInfoTool {
    /// Creates the tool
    pub fn new() -> Self {
        Self
    }
}

impl Default for RagInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ToolExecutor for RagInfoTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "retrieving_rag_info",
            "description": "Retrieves a summary of the reference documents available for semantic retrieval. Use this to judge whether a general or conceptual question is likely answerable from the documents, and to phrase a good retrieval question.",
            "parameters": {
                "type": "object",
                "properties": {}
            }
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult> {
        Ok(ToolResult::success(FILE_INFO.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_summarizes_both_documents() {
        let tool = RagInfoTool::new();
        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("Understanding Credit Card Frauds"));
        assert!(result.output.contains("2024 Report on Payment Fraud"));
        assert!(result.output.contains("skimming"));
    }

    #[test]
    fn test_definition_shape() {
        let tool = RagInfoTool::new();
        let definition = tool.tool_definition();
        assert_eq!(definition["name"], "retrieving_rag_info");
    }
}
