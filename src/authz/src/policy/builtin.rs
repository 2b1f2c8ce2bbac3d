//! Built-in catalog, role grants and route guards

use crate::catalog::PermissionCatalog;
use crate::roles::{RoleMap, RoleProfile};
use crate::routes::RouteGuardTable;
use crate::types::{Permission, PermissionCategory, Role};

use Permission::*;

const CATEGORY_LABELS: &[(PermissionCategory, &str)] = &[
    (PermissionCategory::Dashboard, "Dashboard"),
    (PermissionCategory::Sales, "Sales & POS"),
    (PermissionCategory::Products, "Products"),
    (PermissionCategory::Stock, "Stock Management"),
    (PermissionCategory::Customers, "Customers"),
    (PermissionCategory::Suppliers, "Suppliers & Purchases"),
    (PermissionCategory::Expenses, "Expenses"),
    (PermissionCategory::Reports, "Reports"),
    (PermissionCategory::Users, "User Management"),
    (PermissionCategory::Settings, "Settings"),
    (PermissionCategory::Subscriptions, "Subscriptions"),
];

fn description(permission: Permission) -> &'static str {
    match permission {
        ViewDashboard => "View the dashboard and daily summary",
        ViewSales => "View sales history and receipts",
        CreateSale => "Ring up sales at the point of sale",
        VoidSale => "Void a completed sale",
        ApplyDiscount => "Apply discounts to a sale",
        ProcessRefund => "Process customer refunds",
        ViewProducts => "View the product list",
        CreateProduct => "Add new products",
        EditProduct => "Edit product details and prices",
        DeleteProduct => "Delete products",
        ViewStock => "View stock levels",
        ManageStock => "Receive and manage stock",
        TransferStock => "Transfer stock between locations",
        AdjustStock => "Make manual stock adjustments",
        ViewCustomers => "View customers",
        ManageCustomers => "Add and edit customers",
        ViewSuppliers => "View suppliers",
        ManageSuppliers => "Add and edit suppliers",
        CreatePurchaseOrder => "Create purchase orders",
        ViewExpenses => "View expenses",
        CreateExpense => "Record expenses",
        ApproveExpense => "Approve recorded expenses",
        ViewReports => "View operational reports",
        ViewFinancialReports => "View financial reports",
        ExportReports => "Export reports",
        ViewUsers => "View user accounts",
        ManageUsers => "Create, edit and deactivate users",
        ManageRoles => "Assign roles to users",
        ViewSettings => "View business settings",
        ManageSettings => "Change business settings",
        ViewSubscriptions => "View the subscription plan and billing",
        ManageSubscriptions => "Change the subscription plan",
    }
}

const MANAGER: &[Permission] = &[
    ViewDashboard,
    ViewSales,
    CreateSale,
    VoidSale,
    ApplyDiscount,
    ProcessRefund,
    ViewProducts,
    CreateProduct,
    EditProduct,
    DeleteProduct,
    ViewStock,
    ManageStock,
    TransferStock,
    AdjustStock,
    ViewCustomers,
    ManageCustomers,
    ViewSuppliers,
    ManageSuppliers,
    CreatePurchaseOrder,
    ViewExpenses,
    CreateExpense,
    ViewReports,
    ExportReports,
    ViewUsers,
    ViewSettings,
];

const CASHIER: &[Permission] = &[
    ViewDashboard,
    ViewSales,
    CreateSale,
    ApplyDiscount,
    ViewProducts,
    ViewStock,
    ViewCustomers,
    ManageCustomers,
];

const ACCOUNTANT: &[Permission] = &[
    ViewDashboard,
    ViewSales,
    ViewProducts,
    ViewStock,
    ViewCustomers,
    ViewSuppliers,
    ViewExpenses,
    CreateExpense,
    ApproveExpense,
    ViewReports,
    ViewFinancialReports,
    ExportReports,
];

const ROUTES: &[(&str, Permission)] = &[
    ("/dashboard", ViewDashboard),
    ("/pos", CreateSale),
    ("/sales", ViewSales),
    ("/products", ViewProducts),
    ("/stock", ViewStock),
    ("/stock/transfers", TransferStock),
    ("/customers", ViewCustomers),
    ("/suppliers", ViewSuppliers),
    ("/purchases", CreatePurchaseOrder),
    ("/expenses", ViewExpenses),
    ("/reports", ViewReports),
    ("/reports/financial", ViewFinancialReports),
    ("/users", ViewUsers),
    ("/roles", ManageRoles),
    ("/settings", ViewSettings),
    ("/subscriptions", ViewSubscriptions),
];

pub fn catalog() -> PermissionCatalog {
    let mut catalog = PermissionCatalog::new();
    for (category, label) in CATEGORY_LABELS {
        catalog.set_category_label(*category, *label);
    }
    for permission in Permission::all() {
        catalog.set_entry(*permission, permission.default_category(), description(*permission));
    }
    catalog
}

pub fn roles() -> RoleMap {
    RoleMap::new()
        .with_role(Role::Admin, Permission::all().iter().copied())
        .with_role(Role::Manager, MANAGER.iter().copied())
        .with_role(Role::Cashier, CASHIER.iter().copied())
        .with_role(Role::Accountant, ACCOUNTANT.iter().copied())
        .with_profile(
            Role::Admin,
            RoleProfile::new(
                "Administrator",
                "Full access to every module, including users, settings and subscriptions",
            ),
        )
        .with_profile(
            Role::Manager,
            RoleProfile::new(
                "Manager",
                "Runs the store: sales, products, stock, customers and suppliers",
            ),
        )
        .with_profile(
            Role::Cashier,
            RoleProfile::new("Cashier", "Serves customers at the point of sale"),
        )
        .with_profile(
            Role::Accountant,
            RoleProfile::new("Accountant", "Keeps the books: expenses and financial reports"),
        )
}

pub fn routes() -> RouteGuardTable {
    let mut table = RouteGuardTable::new();
    for (route, permission) in ROUTES {
        table.insert_unchecked(route, *permission);
    }
    table
}
