use crate::entity::{Book, BookId, BookStatus};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookRepository: 'static + Sync + Send {
    async fn find(&self, id: &BookId) -> error_stack::Result<Option<Book>, KernelError>;
    async fn save(&self, book: Book) -> error_stack::Result<Book, KernelError>;
    async fn delete(&self, id: &BookId) -> error_stack::Result<(), KernelError>;
    async fn get_by_status(
        &self,
        status: &BookStatus,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
}

pub trait DependOnBookRepository: 'static + Sync + Send {
    type BookRepository: BookRepository;
    fn book_repository(&self) -> &Self::BookRepository;
}
