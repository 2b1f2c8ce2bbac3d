//! Core authorization types
//!
//! Roles, permissions and categories are closed enumerations. String keys
//! from less trusted boundaries (session data, JSON bodies, policy
//! documents) are parsed into these types with `parse`, which returns `None`
//! for anything outside the vocabulary.

use crate::error::AuthzError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Authority level of an authenticated user
///
/// Deserializes through [`Role::parse`], so session data accepts the same
/// aliases and casing as raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    /// Full access, including users, settings and subscriptions
    Admin,
    /// Runs day-to-day store operations
    Manager,
    /// Point-of-sale operator
    Cashier,
    /// Books, expenses and financial reports
    Accountant,
}

impl Role {
    const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Cashier, Role::Accountant];

    /// Returns the role key as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Accountant => "accountant",
        }
    }

    /// Parses a role key (case-insensitive, accepts legacy aliases).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Admin),
            "manager" | "supervisor" => Some(Role::Manager),
            "cashier" | "operator" => Some(Role::Cashier),
            "accountant" => Some(Role::Accountant),
            _ => None,
        }
    }

    /// Returns every role in the closed set.
    pub fn all() -> &'static [Role] {
        &Self::ALL
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = AuthzError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Display grouping for permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Dashboard,
    Sales,
    Products,
    Stock,
    Customers,
    Suppliers,
    Expenses,
    Reports,
    Users,
    Settings,
    Subscriptions,
}

impl PermissionCategory {
    const ALL: [PermissionCategory; 11] = [
        PermissionCategory::Dashboard,
        PermissionCategory::Sales,
        PermissionCategory::Products,
        PermissionCategory::Stock,
        PermissionCategory::Customers,
        PermissionCategory::Suppliers,
        PermissionCategory::Expenses,
        PermissionCategory::Reports,
        PermissionCategory::Users,
        PermissionCategory::Settings,
        PermissionCategory::Subscriptions,
    ];

    /// Returns the category key as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::Dashboard => "dashboard",
            PermissionCategory::Sales => "sales",
            PermissionCategory::Products => "products",
            PermissionCategory::Stock => "stock",
            PermissionCategory::Customers => "customers",
            PermissionCategory::Suppliers => "suppliers",
            PermissionCategory::Expenses => "expenses",
            PermissionCategory::Reports => "reports",
            PermissionCategory::Users => "users",
            PermissionCategory::Settings => "settings",
            PermissionCategory::Subscriptions => "subscriptions",
        }
    }

    /// Parses a category key.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Returns every category in display order.
    pub fn all() -> &'static [PermissionCategory] {
        &Self::ALL
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionCategory {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionCategory::parse(s).ok_or_else(|| AuthzError::UnknownCategory(s.to_string()))
    }
}

/// Atomic capability that may be granted to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // =========================================================================
    // Dashboard
    // =========================================================================
    ViewDashboard,

    // =========================================================================
    // Sales & POS
    // =========================================================================
    ViewSales,
    CreateSale,
    VoidSale,
    ApplyDiscount,
    ProcessRefund,

    // =========================================================================
    // Products
    // =========================================================================
    ViewProducts,
    CreateProduct,
    EditProduct,
    DeleteProduct,

    // =========================================================================
    // Stock
    // =========================================================================
    ViewStock,
    ManageStock,
    TransferStock,
    AdjustStock,

    // =========================================================================
    // Customers
    // =========================================================================
    ViewCustomers,
    ManageCustomers,

    // =========================================================================
    // Suppliers & purchases
    // =========================================================================
    ViewSuppliers,
    ManageSuppliers,
    CreatePurchaseOrder,

    // =========================================================================
    // Expenses
    // =========================================================================
    ViewExpenses,
    CreateExpense,
    ApproveExpense,

    // =========================================================================
    // Reports
    // =========================================================================
    ViewReports,
    ViewFinancialReports,
    ExportReports,

    // =========================================================================
    // Users
    // =========================================================================
    ViewUsers,
    ManageUsers,
    ManageRoles,

    // =========================================================================
    // Settings
    // =========================================================================
    ViewSettings,
    ManageSettings,

    // =========================================================================
    // Subscriptions
    // =========================================================================
    ViewSubscriptions,
    ManageSubscriptions,
}

impl Permission {
    const ALL: [Permission; 32] = [
        Permission::ViewDashboard,
        Permission::ViewSales,
        Permission::CreateSale,
        Permission::VoidSale,
        Permission::ApplyDiscount,
        Permission::ProcessRefund,
        Permission::ViewProducts,
        Permission::CreateProduct,
        Permission::EditProduct,
        Permission::DeleteProduct,
        Permission::ViewStock,
        Permission::ManageStock,
        Permission::TransferStock,
        Permission::AdjustStock,
        Permission::ViewCustomers,
        Permission::ManageCustomers,
        Permission::ViewSuppliers,
        Permission::ManageSuppliers,
        Permission::CreatePurchaseOrder,
        Permission::ViewExpenses,
        Permission::CreateExpense,
        Permission::ApproveExpense,
        Permission::ViewReports,
        Permission::ViewFinancialReports,
        Permission::ExportReports,
        Permission::ViewUsers,
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ViewSettings,
        Permission::ManageSettings,
        Permission::ViewSubscriptions,
        Permission::ManageSubscriptions,
    ];

    /// Returns the permission key as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ViewSales => "view_sales",
            Permission::CreateSale => "create_sale",
            Permission::VoidSale => "void_sale",
            Permission::ApplyDiscount => "apply_discount",
            Permission::ProcessRefund => "process_refund",
            Permission::ViewProducts => "view_products",
            Permission::CreateProduct => "create_product",
            Permission::EditProduct => "edit_product",
            Permission::DeleteProduct => "delete_product",
            Permission::ViewStock => "view_stock",
            Permission::ManageStock => "manage_stock",
            Permission::TransferStock => "transfer_stock",
            Permission::AdjustStock => "adjust_stock",
            Permission::ViewCustomers => "view_customers",
            Permission::ManageCustomers => "manage_customers",
            Permission::ViewSuppliers => "view_suppliers",
            Permission::ManageSuppliers => "manage_suppliers",
            Permission::CreatePurchaseOrder => "create_purchase_order",
            Permission::ViewExpenses => "view_expenses",
            Permission::CreateExpense => "create_expense",
            Permission::ApproveExpense => "approve_expense",
            Permission::ViewReports => "view_reports",
            Permission::ViewFinancialReports => "view_financial_reports",
            Permission::ExportReports => "export_reports",
            Permission::ViewUsers => "view_users",
            Permission::ManageUsers => "manage_users",
            Permission::ManageRoles => "manage_roles",
            Permission::ViewSettings => "view_settings",
            Permission::ManageSettings => "manage_settings",
            Permission::ViewSubscriptions => "view_subscriptions",
            Permission::ManageSubscriptions => "manage_subscriptions",
        }
    }

    /// Parses a permission key.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }

    /// Returns every permission in catalog display order.
    pub fn all() -> &'static [Permission] {
        &Self::ALL
    }

    /// Category the permission is filed under in the built-in catalog.
    pub fn default_category(&self) -> PermissionCategory {
        use Permission::*;
        match self {
            ViewDashboard => PermissionCategory::Dashboard,
            ViewSales | CreateSale | VoidSale | ApplyDiscount | ProcessRefund => {
                PermissionCategory::Sales
            }
            ViewProducts | CreateProduct | EditProduct | DeleteProduct => {
                PermissionCategory::Products
            }
            ViewStock | ManageStock | TransferStock | AdjustStock => PermissionCategory::Stock,
            ViewCustomers | ManageCustomers => PermissionCategory::Customers,
            ViewSuppliers | ManageSuppliers | CreatePurchaseOrder => PermissionCategory::Suppliers,
            ViewExpenses | CreateExpense | ApproveExpense => PermissionCategory::Expenses,
            ViewReports | ViewFinancialReports | ExportReports => PermissionCategory::Reports,
            ViewUsers | ManageUsers | ManageRoles => PermissionCategory::Users,
            ViewSettings | ManageSettings => PermissionCategory::Settings,
            ViewSubscriptions | ManageSubscriptions => PermissionCategory::Subscriptions,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::parse(s).ok_or_else(|| AuthzError::UnknownPermission(s.to_string()))
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// Ordered, duplicate-free set of permissions.
///
/// Iteration follows insertion order so role listings stay stable for
/// display. Membership checks are O(1). Outside the crate the set is
/// read-only; sets are built by collecting an iterator.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    ordered: Vec<Permission>,
    members: HashSet<Permission>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission, returning `false` if it was already present.
    pub(crate) fn insert(&mut self, permission: Permission) -> bool {
        if self.members.insert(permission) {
            self.ordered.push(permission);
            true
        } else {
            false
        }
    }

    /// Returns `true` if the set contains the given permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.members.contains(&permission)
    }

    /// Returns `true` if every permission in `self` is also in `other`.
    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.members.is_subset(&other.members)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.ordered.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Permission> {
        self.ordered.clone()
    }
}

impl PartialEq for PermissionSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for PermissionSet {}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_aliases() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("  Manager "), Some(Role::Manager));
        assert_eq!(Role::parse("supervisor"), Some(Role::Manager));
        assert_eq!(Role::parse("operator"), Some(Role::Cashier));
        assert_eq!(Role::parse("unknown-role"), None);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_keys_round_trip_through_parse() {
        for role in Role::all() {
            assert_eq!(Role::parse(role.as_str()), Some(*role));
        }
        for category in PermissionCategory::all() {
            assert_eq!(PermissionCategory::parse(category.as_str()), Some(*category));
        }
        for permission in Permission::all() {
            assert_eq!(Permission::parse(permission.as_str()), Some(*permission));
        }
    }

    #[test]
    fn test_permission_keys_are_unique() {
        let keys: HashSet<&str> = Permission::all().iter().map(|p| p.as_str()).collect();
        assert_eq!(keys.len(), Permission::all().len());
    }

    #[test]
    fn test_permission_parse_is_exact() {
        assert_eq!(Permission::parse("create_sale"), Some(Permission::CreateSale));
        assert_eq!(Permission::parse("CREATE_SALE"), None);
        assert_eq!(Permission::parse("launch_rockets"), None);
    }

    #[test]
    fn test_serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&Permission::ApproveExpense).unwrap();
        assert_eq!(json, "\"approve_expense\"");

        let role: Role = serde_json::from_str("\"accountant\"").unwrap();
        assert_eq!(role, Role::Accountant);
    }

    #[test]
    fn test_role_deserializes_like_parse() {
        for (raw, expected) in [
            ("\"supervisor\"", Role::Manager),
            ("\"operator\"", Role::Cashier),
            ("\"Admin\"", Role::Admin),
        ] {
            let role: Role = serde_json::from_str(raw).unwrap();
            assert_eq!(role, expected);
            assert_eq!(Role::parse(raw.trim_matches('"')), Some(expected));
        }

        assert!(serde_json::from_str::<Role>("\"intern\"").is_err());
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
    }

    #[test]
    fn test_permission_set_dedupes_and_keeps_order() {
        let set: PermissionSet = vec![
            Permission::ViewStock,
            Permission::CreateSale,
            Permission::ViewStock,
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.to_vec(), vec![Permission::ViewStock, Permission::CreateSale]);
        assert!(set.contains(Permission::CreateSale));
        assert!(!set.contains(Permission::DeleteProduct));
    }

    #[test]
    fn test_permission_set_subset_and_equality() {
        let small: PermissionSet = [Permission::ViewSales].into_iter().collect();
        let large: PermissionSet = [Permission::CreateSale, Permission::ViewSales]
            .into_iter()
            .collect();
        let reordered: PermissionSet = [Permission::ViewSales, Permission::CreateSale]
            .into_iter()
            .collect();

        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert_eq!(large, reordered);
        assert!(PermissionSet::new().is_subset(&small));
    }

    #[test]
    fn test_permission_set_serializes_in_order() {
        let set: PermissionSet = [Permission::ViewUsers, Permission::ViewDashboard]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["view_users","view_dashboard"]"#);
    }
}
