use crate::controller::Intake;
use application::transfer::{
    CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto, UpdateStockDto,
};
use kernel::prelude::entity::BookStatus;
use serde::Deserialize;
use uuid::Uuid;

// Missing fields are reported by validation, not by the extractor.
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    title: Option<String>,
    summary: Option<String>,
    year: Option<i32>,
    status: Option<BookStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    title: Option<String>,
    summary: Option<String>,
    year: Option<i32>,
    status: Option<BookStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    quantity: i32,
}

#[derive(Debug)]
pub struct GetBookRequest {
    id: Uuid,
}

impl GetBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: Uuid,
}

impl DeleteBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct BookTransformer;

impl Intake<CreateBookRequest> for BookTransformer {
    type To = CreateBookDto;
    fn emit(&self, input: CreateBookRequest) -> Self::To {
        CreateBookDto {
            title: input.title,
            summary: input.summary,
            year: input.year,
            status: input.status,
        }
    }
}

impl Intake<(Uuid, UpdateBookRequest)> for BookTransformer {
    type To = UpdateBookDto;
    fn emit(&self, input: (Uuid, UpdateBookRequest)) -> Self::To {
        let (id, input) = input;
        UpdateBookDto {
            id,
            title: input.title,
            summary: input.summary,
            year: input.year,
            status: input.status,
        }
    }
}

impl Intake<(Uuid, UpdateStockRequest)> for BookTransformer {
    type To = UpdateStockDto;
    fn emit(&self, input: (Uuid, UpdateStockRequest)) -> Self::To {
        let (id, input) = input;
        UpdateStockDto {
            id,
            quantity: input.quantity,
        }
    }
}

impl Intake<GetBookRequest> for BookTransformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<DeleteBookRequest> for BookTransformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}
