//! Built-in operation table
//!
//! Covers the commonly used Selling Partner API endpoint groups. Applications
//! needing more can load a catalog file or build their own
//! [`OperationCatalog`] and hand it to the client builder.

use spapi_domain::{GrantlessScope, HttpMethod, OperationDescriptor, Result, SandboxCase};

use super::{EndpointGroup, OperationCatalog};

fn get(path: &str) -> OperationDescriptor {
    OperationDescriptor::new(HttpMethod::Get, path)
}

fn post(path: &str) -> OperationDescriptor {
    OperationDescriptor::new(HttpMethod::Post, path)
}

fn delete(path: &str) -> OperationDescriptor {
    OperationDescriptor::new(HttpMethod::Delete, path)
}

fn sandbox<const N: usize>(params: [(&str, &str); N]) -> SandboxCase {
    SandboxCase::new(params)
}

impl OperationCatalog {
    /// The built-in catalog
    ///
    /// # Errors
    /// Returns [`spapi_domain::SpApiError::InvalidCatalog`] only if the
    /// built-in table itself is inconsistent
    pub fn builtin() -> Result<Self> {
        Self::from_endpoints([
            ("sellers", sellers()),
            ("catalogItems", catalog_items()),
            ("orders", orders()),
            ("notifications", notifications()),
            ("authorization", authorization()),
            ("reports", reports()),
            ("feeds", feeds()),
            ("tokens", tokens()),
            ("fbaInventory", fba_inventory()),
            ("productPricing", product_pricing()),
            ("finances", finances()),
        ])
    }
}

fn sellers() -> EndpointGroup {
    EndpointGroup::new("v1").version(
        "v1",
        [
            (
                "getMarketplaceParticipations",
                get("/sellers/v1/marketplaceParticipations").sandbox_case(sandbox([])),
            ),
            ("getAccount", get("/sellers/v1/account")),
        ],
    )
}

fn catalog_items() -> EndpointGroup {
    EndpointGroup::new("2022-04-01")
        .version(
            "v0",
            [
                (
                    "listCatalogItems",
                    get("/catalog/v0/items").sandbox_case(sandbox([
                        ("MarketplaceId", "TEST_CASE_200"),
                        ("SellerSKU", "SKU_200"),
                    ])),
                ),
                (
                    "getCatalogItem",
                    get("/catalog/v0/items/{asin}").sandbox_case(sandbox([
                        ("MarketplaceId", "TEST_CASE_200"),
                        ("asin", "ASIN_200"),
                    ])),
                ),
                ("listCatalogCategories", get("/catalog/v0/categories")),
            ],
        )
        .version(
            "2020-12-01",
            [
                ("getCatalogItem", get("/catalog/2020-12-01/items/{asin}")),
                ("searchCatalogItems", get("/catalog/2020-12-01/items")),
            ],
        )
        .version(
            "2022-04-01",
            [
                ("getCatalogItem", get("/catalog/2022-04-01/items/{asin}")),
                ("searchCatalogItems", get("/catalog/2022-04-01/items")),
            ],
        )
}

fn orders() -> EndpointGroup {
    EndpointGroup::new("v0").version(
        "v0",
        [
            (
                "getOrders",
                get("/orders/v0/orders").sandbox_case(sandbox([
                    ("CreatedAfter", "TEST_CASE_200"),
                    ("MarketplaceIds", "ATVPDKIKX0DER"),
                ])),
            ),
            (
                "getOrder",
                get("/orders/v0/orders/{orderId}")
                    .sandbox_case(sandbox([("orderId", "TEST_CASE_200")])),
            ),
            (
                "getOrderBuyerInfo",
                get("/orders/v0/orders/{orderId}/buyerInfo")
                    .sandbox_case(sandbox([("orderId", "TEST_CASE_200")])),
            ),
            (
                "getOrderAddress",
                get("/orders/v0/orders/{orderId}/address")
                    .sandbox_case(sandbox([("orderId", "TEST_CASE_200")])),
            ),
            (
                "getOrderItems",
                get("/orders/v0/orders/{orderId}/orderItems")
                    .sandbox_case(sandbox([("orderId", "TEST_CASE_200")])),
            ),
            ("updateShipmentStatus", post("/orders/v0/orders/{orderId}/shipment")),
        ],
    )
}

fn notifications() -> EndpointGroup {
    let scope = GrantlessScope::Notifications;
    EndpointGroup::new("v1").version(
        "v1",
        [
            ("getSubscription", get("/notifications/v1/subscriptions/{notificationType}")),
            ("createSubscription", post("/notifications/v1/subscriptions/{notificationType}")),
            (
                "getSubscriptionById",
                get("/notifications/v1/subscriptions/{notificationType}/{subscriptionId}")
                    .grantless(scope),
            ),
            (
                "deleteSubscriptionById",
                delete("/notifications/v1/subscriptions/{notificationType}/{subscriptionId}")
                    .grantless(scope),
            ),
            ("getDestinations", get("/notifications/v1/destinations").grantless(scope)),
            ("createDestination", post("/notifications/v1/destinations").grantless(scope)),
            (
                "getDestination",
                get("/notifications/v1/destinations/{destinationId}").grantless(scope),
            ),
            (
                "deleteDestination",
                delete("/notifications/v1/destinations/{destinationId}").grantless(scope),
            ),
        ],
    )
}

fn authorization() -> EndpointGroup {
    EndpointGroup::new("v1").version(
        "v1",
        [(
            "getAuthorizationCode",
            get("/authorization/v1/authorizationCode").grantless(GrantlessScope::Migration),
        )],
    )
}

fn reports() -> EndpointGroup {
    EndpointGroup::new("2021-06-30")
        .version("2020-09-04", report_operations("2020-09-04"))
        .version("2021-06-30", report_operations("2021-06-30"))
}

fn report_operations(version: &str) -> [(&'static str, OperationDescriptor); 5] {
    [
        ("getReports", get(&format!("/reports/{version}/reports"))),
        ("createReport", post(&format!("/reports/{version}/reports"))),
        ("getReport", get(&format!("/reports/{version}/reports/{{reportId}}"))),
        ("cancelReport", delete(&format!("/reports/{version}/reports/{{reportId}}"))),
        (
            "getReportDocument",
            get(&format!("/reports/{version}/documents/{{reportDocumentId}}")),
        ),
    ]
}

fn feeds() -> EndpointGroup {
    EndpointGroup::new("2021-06-30").version(
        "2021-06-30",
        [
            ("getFeeds", get("/feeds/2021-06-30/feeds")),
            ("createFeed", post("/feeds/2021-06-30/feeds")),
            ("getFeed", get("/feeds/2021-06-30/feeds/{feedId}")),
            ("cancelFeed", delete("/feeds/2021-06-30/feeds/{feedId}")),
            ("createFeedDocument", post("/feeds/2021-06-30/documents")),
            ("getFeedDocument", get("/feeds/2021-06-30/documents/{feedDocumentId}")),
        ],
    )
}

fn tokens() -> EndpointGroup {
    EndpointGroup::new("2021-03-01").version(
        "2021-03-01",
        [("createRestrictedDataToken", post("/tokens/2021-03-01/restrictedDataToken"))],
    )
}

fn fba_inventory() -> EndpointGroup {
    EndpointGroup::new("v1")
        .version("v1", [("getInventorySummaries", get("/fba/inventory/v1/summaries"))])
}

fn product_pricing() -> EndpointGroup {
    EndpointGroup::new("v0").version(
        "v0",
        [
            ("getPricing", get("/products/pricing/v0/price")),
            ("getCompetitivePricing", get("/products/pricing/v0/competitivePrice")),
            ("getItemOffers", get("/products/pricing/v0/items/{Asin}/offers")),
            ("getListingOffers", get("/products/pricing/v0/listings/{SellerSKU}/offers")),
        ],
    )
}

fn finances() -> EndpointGroup {
    EndpointGroup::new("v0").version(
        "v0",
        [
            ("listFinancialEventGroups", get("/finances/v0/financialEventGroups")),
            ("listFinancialEvents", get("/finances/v0/financialEvents")),
            (
                "listFinancialEventsByGroupId",
                get("/finances/v0/financialEventGroups/{eventGroupId}/financialEvents"),
            ),
            (
                "listFinancialEventsByOrderId",
                get("/finances/v0/orders/{orderId}/financialEvents"),
            ),
        ],
    )
}
