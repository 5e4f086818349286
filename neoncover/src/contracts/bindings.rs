//! ABI bindings for the external insurance and token contracts.
//!
//! Only the surface this crate consumes is declared; both contracts are
//! deployed and owned elsewhere.

alloy::sol! {
    /// The SecurePool insurance contract.
    interface ISecurePoolInsurance {
        event PolicyPurchased(
            uint256 indexed policyId,
            address indexed policyholder,
            uint256 coverageAmount
        );
        event ClaimSubmitted(
            uint256 indexed policyId,
            address indexed policyholder,
            uint256 claimAmount
        );

        function purchasePolicy(uint256 coverageAmount, uint256 duration, string riskType)
            external
            payable;
        function submitClaim(uint256 policyId, uint256 claimAmount, string evidence) external;
        function provideLiquidity(uint256 amount) external;
        function withdrawLiquidity(uint256 amount) external;
        function calculatePremium(uint256 coverageAmount, uint256 duration)
            external
            view
            returns (uint256 premium);
        function getUserPolicies(address user) external view returns (uint256[] policyIds);
        function getCapitalPoolStats() external view returns (
            uint256 totalDeposits,
            uint256 availableLiquidity,
            uint256 lockedLiquidity,
            uint256 totalRewards
        );
        function policies(uint256 policyId) external view returns (
            uint256 id,
            address policyholder,
            uint256 coverageAmount,
            uint256 premiumPaid,
            uint256 startTime,
            uint256 endTime,
            bool isActive,
            bool claimed,
            string riskType
        );
    }

    /// The pool's fungible token, with a test faucet.
    interface IFaucetToken {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function faucet() external;
        function allowance(address owner, address spender) external view returns (uint256);
    }
}
