// src/services/owner_invariant.rs
//
// Regras que impedem um negócio de ficar sem dono. Funções puras: recebem os
// vínculos ativos já lidos (e travados) pela transação de quem chama.

use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::membership::{Membership, Role};

pub fn active_owner_count(active_members: &[Membership]) -> usize {
    active_members.iter().filter(|m| m.is_active_owner()).count()
}

pub fn check_role_change(
    acting_profile_id: Uuid,
    target: &Membership,
    new_role: Role,
    active_members: &[Membership],
) -> Result<(), AppError> {
    if target.profile_id == acting_profile_id {
        return Err(AppError::Validation(
            "Você não pode alterar o seu próprio cargo.".into(),
        ));
    }

    if target.is_active_owner()
        && new_role != Role::Owner
        && active_owner_count(active_members) <= 1
    {
        return Err(AppError::Validation(
            "O negócio precisa de pelo menos um dono ativo.".into(),
        ));
    }

    Ok(())
}

pub fn check_removal(
    acting_profile_id: Uuid,
    target: &Membership,
    active_members: &[Membership],
) -> Result<(), AppError> {
    if target.profile_id == acting_profile_id {
        return Err(AppError::Validation(
            "Você não pode remover a si mesmo do negócio.".into(),
        ));
    }

    if target.is_owner && active_owner_count(active_members) <= 1 {
        return Err(AppError::Validation(
            "Não é possível remover o último dono do negócio.".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(business_id: Uuid, role: Role) -> Membership {
        Membership {
            business_id,
            profile_id: Uuid::new_v4(),
            role,
            is_owner: role == Role::Owner,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn counts_only_active_owners() {
        let business = Uuid::new_v4();
        let mut retired = member(business, Role::Owner);
        retired.is_active = false;
        let members = vec![
            member(business, Role::Owner),
            member(business, Role::Admin),
            retired,
        ];
        assert_eq!(active_owner_count(&members), 1);
    }

    #[test]
    fn self_target_is_always_rejected() {
        let business = Uuid::new_v4();
        let owner = member(business, Role::Owner);
        let other_owner = member(business, Role::Owner);
        let members = vec![owner.clone(), other_owner];

        assert!(matches!(
            check_role_change(owner.profile_id, &owner, Role::Admin, &members),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            check_removal(owner.profile_id, &owner, &members),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn last_owner_cannot_be_removed() {
        let business = Uuid::new_v4();
        let owner = member(business, Role::Owner);
        let admin = member(business, Role::Admin);
        let members = vec![owner.clone(), admin.clone()];

        assert!(matches!(
            check_removal(admin.profile_id, &owner, &members),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn one_of_two_owners_can_be_removed() {
        let business = Uuid::new_v4();
        let p1 = member(business, Role::Owner);
        let p2 = member(business, Role::Owner);
        let members = vec![p1.clone(), p2.clone()];

        assert!(check_removal(p1.profile_id, &p2, &members).is_ok());

        // Depois da remoção, P1 é o único dono restante
        let remaining = vec![p1.clone()];
        assert!(matches!(
            check_removal(p2.profile_id, &p1, &remaining),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn sole_owner_cannot_be_demoted() {
        let business = Uuid::new_v4();
        let owner = member(business, Role::Owner);
        let admin = member(business, Role::Admin);
        let members = vec![owner.clone(), admin.clone()];

        assert!(matches!(
            check_role_change(admin.profile_id, &owner, Role::Viewer, &members),
            Err(AppError::Validation(_))
        ));
        // Manter como dono não reduz a contagem
        assert!(check_role_change(admin.profile_id, &owner, Role::Owner, &members).is_ok());
    }

    #[test]
    fn non_owner_role_changes_pass() {
        let business = Uuid::new_v4();
        let owner = member(business, Role::Owner);
        let editor = member(business, Role::Editor);
        let members = vec![owner.clone(), editor.clone()];

        assert!(check_role_change(owner.profile_id, &editor, Role::Admin, &members).is_ok());
        assert!(check_removal(owner.profile_id, &editor, &members).is_ok());
    }
}
