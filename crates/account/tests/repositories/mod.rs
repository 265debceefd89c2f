mod account_repository_it;
