//! Centralized Contract Definitions
//!
//! All on-chain interfaces the bot touches, defined once with ethers
//! `abigen!` human-readable ABIs.
//!
//! - IQuoter: Uniswap V3 QuoterV1 single-hop exact-input pricing.
//!   Declared `view` so calls go out as eth_call simulations.
//! - IUniswapV2Router02: SushiSwap V2 path-based output amounts.
//! - IArbitrage: the deployed settlement contract's execution entry point
//!   (owner-gated, enforces its own amountOutMinimum internally).
//! - IERC20: balance reads for realized-profit derivation.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use ethers::prelude::abigen;

abigen!(
    IQuoter,
    r#"[
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external view returns (uint256 amountOut)
    ]"#
);

abigen!(
    IUniswapV2Router02,
    r#"[
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts)
    ]"#
);

abigen!(
    IArbitrage,
    r#"[
        function executeArbitrage(address token0, address token1, uint256 amountIn, uint24 fee, uint256 amountOutMinimum) external
        function owner() external view returns (address)
    ]"#
);

abigen!(
    IERC20,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function decimals() external view returns (uint8)
    ]"#
);
