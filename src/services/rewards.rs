//! Rewards ledger gRPC service.

use tonic::{Request, Response, Status};
use tracing::{error, info};

use crate::model::PaymentEvent;
use crate::proto::{
    rewards_ledger_server::RewardsLedger as RewardsLedgerTrait, Balance, CompleteReelRequest,
    DailyLoginRequest, DrawRequest, Earning, EarningsSummary, EngagementRequest,
    GetBalanceRequest, GetEarningsRequest, GetHistoryRequest, GetPendingPayoutsRequest,
    LuckyDrawPool, LuckyDrawPoolRequest, MarkEarningPaidRequest, PaymentEvent as ProtoPaymentEvent,
    PaymentOutcome as ProtoPaymentOutcome, PendingPayouts, PurchaseTicketsRequest,
    PurchaseTicketsResponse, ReelOutcome, RegisterUserRequest, RewardHistory, Ticket, UserAccount,
};
use crate::proto_ext::{
    engagement_action_from_proto, format_money, parse_optional_money, payment_method_from_proto,
    views_from_proto,
};
use crate::rewards::{EngagementEvent, LedgerError, PaymentOutcome, RewardsLedger};
use crate::transport::USER_ID_HEADER;

/// Rewards ledger service.
///
/// Thin adapter from the proto API to [`RewardsLedger`]. Every call acts on
/// behalf of the user named in the `x-user-id` metadata.
pub struct RewardsService {
    ledger: RewardsLedger,
}

impl RewardsService {
    pub fn new(ledger: RewardsLedger) -> Self {
        Self { ledger }
    }
}

/// Acting user of a request. Missing or blank header is unauthenticated.
fn acting_user<T>(request: &Request<T>) -> Result<String, Status> {
    request
        .metadata()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Status::unauthenticated(format!("missing {} metadata", USER_ID_HEADER)))
}

fn to_status(operation: &str, err: LedgerError) -> Status {
    if matches!(err, LedgerError::Storage(_)) {
        error!(operation, error = %err, "Ledger storage failure");
    }
    Status::from(err)
}

#[tonic::async_trait]
impl RewardsLedgerTrait for RewardsService {
    async fn register_user(
        &self,
        request: Request<RegisterUserRequest>,
    ) -> Result<Response<UserAccount>, Status> {
        let user_id = acting_user(&request)?;
        let account = self
            .ledger
            .register_user(&user_id)
            .await
            .map_err(|e| to_status("register_user", e))?;
        Ok(Response::new(account.into()))
    }

    async fn get_balance(
        &self,
        request: Request<GetBalanceRequest>,
    ) -> Result<Response<Balance>, Status> {
        let user_id = acting_user(&request)?;
        let reward_points = self
            .ledger
            .balance(&user_id)
            .await
            .map_err(|e| to_status("get_balance", e))?;
        Ok(Response::new(Balance { reward_points }))
    }

    async fn get_history(
        &self,
        request: Request<GetHistoryRequest>,
    ) -> Result<Response<RewardHistory>, Status> {
        let user_id = acting_user(&request)?;
        let entries = self
            .ledger
            .history(&user_id)
            .await
            .map_err(|e| to_status("get_history", e))?;
        Ok(Response::new(RewardHistory {
            entries: entries.into_iter().map(Into::into).collect(),
        }))
    }

    async fn record_engagement(
        &self,
        request: Request<EngagementRequest>,
    ) -> Result<Response<Balance>, Status> {
        let user_id = acting_user(&request)?;
        let action = engagement_action_from_proto(request.get_ref().action)?;
        let reward_points = self
            .ledger
            .record_engagement(&user_id, EngagementEvent::Action(action))
            .await
            .map_err(|e| to_status("record_engagement", e))?;
        Ok(Response::new(Balance { reward_points }))
    }

    async fn claim_daily_login(
        &self,
        request: Request<DailyLoginRequest>,
    ) -> Result<Response<Balance>, Status> {
        let user_id = acting_user(&request)?;
        let reward_points = self
            .ledger
            .claim_daily_login(&user_id)
            .await
            .map_err(|e| to_status("claim_daily_login", e))?;
        Ok(Response::new(Balance { reward_points }))
    }

    async fn complete_reel(
        &self,
        request: Request<CompleteReelRequest>,
    ) -> Result<Response<ReelOutcome>, Status> {
        let user_id = acting_user(&request)?;
        let views = views_from_proto(request.get_ref().views)?;
        let outcome = self
            .ledger
            .complete_reel(&user_id, views)
            .await
            .map_err(|e| to_status("complete_reel", e))?;
        Ok(Response::new(outcome.into()))
    }

    async fn get_earnings(
        &self,
        request: Request<GetEarningsRequest>,
    ) -> Result<Response<EarningsSummary>, Status> {
        let user_id = acting_user(&request)?;
        let summary = self
            .ledger
            .earnings_summary(&user_id)
            .await
            .map_err(|e| to_status("get_earnings", e))?;
        Ok(Response::new(summary.into()))
    }

    async fn get_pending_payouts(
        &self,
        request: Request<GetPendingPayoutsRequest>,
    ) -> Result<Response<PendingPayouts>, Status> {
        let user_id = acting_user(&request)?;
        let amount = self
            .ledger
            .pending_payouts(&user_id)
            .await
            .map_err(|e| to_status("get_pending_payouts", e))?;
        Ok(Response::new(PendingPayouts {
            amount: format_money(amount),
        }))
    }

    async fn mark_earning_paid(
        &self,
        request: Request<MarkEarningPaidRequest>,
    ) -> Result<Response<Earning>, Status> {
        acting_user(&request)?;
        let earning_id = uuid::Uuid::parse_str(&request.get_ref().earning_id)
            .map_err(|e| Status::invalid_argument(format!("Invalid earning id: {}", e)))?;
        let earning = self
            .ledger
            .mark_earning_paid(earning_id)
            .await
            .map_err(|e| to_status("mark_earning_paid", e))?;
        Ok(Response::new(earning.into()))
    }

    async fn get_lucky_draw_pool(
        &self,
        request: Request<LuckyDrawPoolRequest>,
    ) -> Result<Response<LuckyDrawPool>, Status> {
        let user_id = acting_user(&request)?;
        let base_amount = parse_optional_money("base_amount", &request.get_ref().base_amount)?;
        let pool = self
            .ledger
            .lucky_draw_pool(&user_id, base_amount, chrono::Utc::now())
            .await
            .map_err(|e| to_status("get_lucky_draw_pool", e))?;
        Ok(Response::new(pool.into()))
    }

    async fn purchase_tickets(
        &self,
        request: Request<PurchaseTicketsRequest>,
    ) -> Result<Response<PurchaseTicketsResponse>, Status> {
        let user_id = acting_user(&request)?;
        let req = request.into_inner();
        let method = payment_method_from_proto(req.payment_method)?;

        let receipt = self
            .ledger
            .purchase_tickets(&user_id, &req.event_id, req.quantity, method)
            .await
            .map_err(|e| to_status("purchase_tickets", e))?;

        Ok(Response::new(PurchaseTicketsResponse {
            ticket_ids: receipt.tickets.into_iter().map(|t| t.id).collect(),
            reward_points: receipt.reward_points,
        }))
    }

    async fn record_payment(
        &self,
        request: Request<ProtoPaymentEvent>,
    ) -> Result<Response<ProtoPaymentOutcome>, Status> {
        let user_id = acting_user(&request)?;
        let event = PaymentEvent::try_from(request.into_inner())?;

        let outcome = self
            .ledger
            .handle_payment(&user_id, event)
            .await
            .map_err(|e| to_status("record_payment", e))?;

        let response = match outcome {
            PaymentOutcome::Tickets(tickets) => ProtoPaymentOutcome {
                ticket_ids: tickets.into_iter().map(|t| t.id).collect(),
                earning: None,
                unapplied: false,
            },
            PaymentOutcome::Credited(earning) => ProtoPaymentOutcome {
                ticket_ids: Vec::new(),
                earning: Some(earning.into()),
                unapplied: false,
            },
            PaymentOutcome::Unapplied(earning) => ProtoPaymentOutcome {
                ticket_ids: Vec::new(),
                earning: Some(earning.into()),
                unapplied: true,
            },
        };
        Ok(Response::new(response))
    }

    async fn draw(&self, request: Request<DrawRequest>) -> Result<Response<Ticket>, Status> {
        let user_id = acting_user(&request)?;
        let event_id = request.into_inner().event_id;
        info!(user_id = %user_id, event_id = %event_id, "Draw requested");
        let winner = self
            .ledger
            .draw(&event_id)
            .await
            .map_err(|e| to_status("draw", e))?;
        Ok(Response::new(winner.into()))
    }
}
