/// Monetary amounts. Plain IEEE-754 doubles; callers round for display.
pub type Money = f64;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = f64;

/// Multiples (e.g., 10x final-year cash flow)
pub type Multiple = f64;

/// Share counts, in the same implicit unit as the resulting equity value
pub type Shares = f64;
