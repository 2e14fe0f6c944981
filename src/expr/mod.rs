pub mod ast;
pub mod context;
pub mod expr;
pub mod op;
pub mod predicates;

pub use context::{new_ctx, Context, ExprBuilder, ExprCtx};
pub use expr::Expr;
pub use op::{BinOp, UnOp};
