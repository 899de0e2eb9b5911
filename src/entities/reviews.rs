use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    /// Catalog movie id, opaque string from TMDB
    pub movie_id: String,

    pub movie_title: String,

    pub movie_poster: Option<String>,

    /// 1..=10
    pub rating: i32,

    /// At least 10 characters
    pub review_text: String,

    pub is_featured: bool,

    /// JSON array of critic tag strings
    pub critic_tags: Option<String>,

    pub critic_screenplay: Option<i32>,

    pub critic_acting: Option<i32>,

    pub critic_cinematography: Option<i32>,

    pub critic_soundtrack: Option<i32>,

    pub critic_directing: Option<i32>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::review_likes::Entity")]
    ReviewLikes,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::review_likes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewLikes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
