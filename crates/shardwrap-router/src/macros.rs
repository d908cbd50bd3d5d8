/// Declare a DAO interface and its transactional operations
///
/// Emits the trait, an implementation of it for `DaoProxy<Real>` and the
/// [`DeclaredOperations`](crate::DeclaredOperations) table for the real type.
/// Methods tagged `#[transactional]` run inside a read-write unit of work,
/// `#[transactional(read_only = true)]` inside a read-only one; they must
/// return `Result<_, E>` with `E: From<TransactionError>`. Untagged methods
/// are forwarded as-is and may return anything, including `()`.
///
/// Other method attributes (doc comments, `#[must_use]`, ...) are kept on the
/// generated trait method.
///
/// ```rust,ignore
/// sharded_dao! {
///     pub trait AccountDao for AccountStore {
///         /// Current balance
///         #[transactional(read_only = true)]
///         fn balance(&self, account: &str) -> Result<i64, StoreError>;
///         #[transactional]
///         fn deposit(&self, account: &str, amount: i64) -> Result<i64, StoreError>;
///         fn table(&self) -> String;
///     }
/// }
///
/// impl AccountDao for AccountStore { /* real queries */ }
/// ```
///
/// Only one `sharded_dao!` block may name a given real type.
///
/// `DaoProxy` has inherent `build`, `shard`, `declarations`, `invoke` and
/// `passthrough` methods. Method-call syntax on the proxy resolves to those
/// first, so a trait method with one of these names is only reachable as
/// `Trait::method(&proxy)`. Prefer other names.
#[macro_export]
macro_rules! sharded_dao {
    // Dispatch on the first `transactional` tag, if any
    (
        @call [[transactional $($tag:tt)*] $($rest:tt)*]
        $proxy:ident, $method:ident, $call:expr
    ) => {
        $proxy.invoke(stringify!($method), $call)
    };
    (
        @call [[$($other:tt)*] $($rest:tt)*]
        $proxy:ident, $method:ident, $call:expr
    ) => {
        $crate::sharded_dao!(@call [$($rest)*] $proxy, $method, $call)
    };
    (@call [] $proxy:ident, $method:ident, $call:expr) => {
        $proxy.passthrough($call)
    };

    (
        @declare $table:ident, $method:ident,
        [[transactional(read_only = $read_only:literal)] $($rest:tt)*]
    ) => {
        $table.declare(
            stringify!($method),
            $crate::TransactionalDeclaration { read_only: $read_only },
        );
    };
    (@declare $table:ident, $method:ident, [[transactional] $($rest:tt)*]) => {
        $table.declare(stringify!($method), $crate::TransactionalDeclaration::read_write());
    };
    (@declare $table:ident, $method:ident, [[$($other:tt)*] $($rest:tt)*]) => {
        $crate::sharded_dao!(@declare $table, $method, [$($rest)*]);
    };
    (@declare $table:ident, $method:ident, []) => {};

    // Trait method with the `transactional` tags stripped
    (@trait_fn [$($kept:tt)*] [[transactional $($tag:tt)*] $($rest:tt)*] $sig:tt) => {
        $crate::sharded_dao!(@trait_fn [$($kept)*] [$($rest)*] $sig);
    };
    (@trait_fn [$($kept:tt)*] [[$($other:tt)*] $($rest:tt)*] $sig:tt) => {
        $crate::sharded_dao!(@trait_fn [$($kept)* #[$($other)*]] [$($rest)*] $sig);
    };
    (@trait_fn [$($kept:tt)*] [] { $($sig:tt)* }) => {
        $($kept)* $($sig)*
    };

    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident for $dao:ty {
            $(
                $(#[$($attr:tt)*])*
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name {
            $(
                $crate::sharded_dao!(
                    @trait_fn [] [$([$($attr)*])*]
                    { fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)?; }
                );
            )*
        }

        impl $name for $crate::DaoProxy<$dao> {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)? {
                    $crate::sharded_dao!(
                        @call [$([$($attr)*])*] self, $method,
                        |dao: &$dao| <$dao as $name>::$method(dao $(, $arg)*)
                    )
                }
            )*
        }

        impl $crate::DeclaredOperations for $dao {
            fn declarations() -> $crate::DeclarationTable {
                #[allow(unused_mut)]
                let mut table = $crate::DeclarationTable::new();
                $(
                    $crate::sharded_dao!(@declare table, $method, [$([$($attr)*])*]);
                )*
                table
            }
        }
    };
}
