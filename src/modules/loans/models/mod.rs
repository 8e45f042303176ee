pub mod loan;
pub mod loan_payment;

pub use loan::{CreateLoanRequest, Loan, LoanResponse, LoanStatus};
pub use loan_payment::{CreateLoanPaymentRequest, LoanPayment, PaymentType};
